#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env_remove("TIMELINE_ENGINE_CONFIG")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_loads_template_and_shows_timeline() {
    run_cli("start 2024-03-04\ntemplate Standard\nshow\nquit\n")
        .success()
        .stdout(str_contains("Loaded template Standard Sell-Side M&A."))
        .stdout(str_contains("Kick-off & Information Gathering"))
        .stdout(str_contains("2024-03-04"));
}

#[test]
fn cli_lists_templates_without_argument() {
    run_cli("template\nquit\n")
        .success()
        .stdout(str_contains("fast_track"))
        .stdout(str_contains("buy_side"));
}

#[test]
fn cli_delete_command_removes_task() {
    run_cli("add A 1 First task\nadd B 2 Second task\ndelete B\nquit\n")
        .success()
        .stdout(str_contains("Task A added."))
        .stdout(str_contains("Deleted task B."));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().to_string();
    let script = format!(
        "add A 4 PersistMe\nsave json {path}\nadd B 1 Scratch\nload json {path}\nshow\nquit\n"
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Project saved to"));
    assert!(output.contains("Project loaded from"));
    let after_reload = output
        .split("Project loaded from")
        .last()
        .unwrap_or_default();
    assert!(after_reload.contains("PersistMe"));
    assert!(
        !after_reload.contains("Scratch"),
        "scratch task should not survive the reload:\n{after_reload}"
    );
}

#[test]
fn cli_compress_reports_block_ratios() {
    run_cli("start 2024-03-04\ntemplate Standard\ncompress 2024-04-01 -\nquit\n")
        .success()
        .stdout(str_contains("Compressed (block1="))
        .stdout(str_contains("block2=-)"));
}

#[test]
fn cli_rejects_bad_compress_dates() {
    run_cli("compress 2024-13-01\nquit\n")
        .success()
        .stdout(str_contains("Invalid date '2024-13-01'"));
}

#[test]
fn cli_injects_vdd_once() {
    run_cli("start 2024-03-04\ntemplate Standard\nvdd\nvdd\nquit\n")
        .success()
        .stdout(str_contains("VDD workstream injected."))
        .stdout(str_contains("VDD workstream already present."))
        .stdout(str_contains("(Shortened due to VDD)"));
}

#[test]
fn cli_reports_absence_conflicts() {
    // T3.2 (Bottleneck) runs from the offer decision for two weeks
    let script = "start 2024-03-04\ntemplate Standard\nabsence Alice 2024-01-01 2024-12-31\nconflicts\nquit\n";
    run_cli(script)
        .success()
        .stdout(str_contains("Absence of Alice recorded."))
        .stdout(str_contains("WARNING:"))
        .stdout(str_contains("Management Presentations & Site Visits"));
}

#[test]
fn cli_reports_no_conflicts_without_absences() {
    run_cli("conflicts\nquit\n")
        .success()
        .stdout(str_contains("No conflicts."));
}

#[test]
fn cli_unknown_command_is_reported() {
    run_cli("frobnicate\nquit\n")
        .success()
        .stdout(str_contains("Unknown command 'frobnicate'"));
}
