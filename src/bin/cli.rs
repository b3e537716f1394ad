use std::io::{self, Write};

use chrono::{Local, NaiveDate};
use timeline_engine::persistence::{self, ProjectStore};
use timeline_engine::{
    Absence, EngineConfig, Project, ProjectTemplate, Task, TaskType, TimelineEngine,
    find_absence_conflicts,
};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TIMELINE_ENGINE_LOG";

fn parse_pred_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// `-` or `none` clears an optional date argument.
fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match s {
        None | Some("-") | Some("none") => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| format!("Invalid date '{raw}' (YYYY-MM-DD)")),
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

fn render_row(widths: &[usize], cells: &[&str]) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.iter().enumerate() {
        let pad = widths[ci].saturating_sub(cell.chars().count());
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(pad));
        line.push_str(" |");
    }
    line
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&render_row(&widths, &cells));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_project(project: &Project, critical_ratio: f64) -> String {
    let headers = [
        "#", "id", "phase", "name", "type", "weeks", "ratio", "preds", "offset", "start", "end",
    ];
    let rows: Vec<Vec<String>> = project
        .tasks
        .iter()
        .map(|task| {
            let ratio = if task.is_critically_compressed(critical_ratio) {
                format!("{:.2}!", task.compression_ratio)
            } else {
                format!("{:.2}", task.compression_ratio)
            };
            vec![
                task.serial_number.to_string(),
                task.id.clone(),
                task.phase.clone(),
                task.name.clone(),
                task.task_type.to_string(),
                format!("{:.2}", task.duration_weeks),
                ratio,
                task.predecessors.join(","),
                task.manual_start_offset.to_string(),
                format_date(task.computed_start),
                format_date(task.computed_end),
            ]
        })
        .collect();
    format!(
        "{} | start {} | jurisdictions {}\n{}",
        project.name,
        project.start_date,
        project.jurisdictions.join(","),
        render_text_table(&headers, &rows)
    )
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show current timeline\n  template <name>                    Load a template (Standard, Fast-Track, Buy-Side)\n  start <YYYY-MM-DD>                 Set project start date\n  country <codes_csv>                Set holiday jurisdictions (e.g. US,BR)\n  add <id> <weeks> <name...>         Append a task\n  rename <id> <name...>              Set task name\n  phase <id> <phase...>              Set task phase\n  type <id> <type...>                Set task type\n  dur <id> <weeks>                   Set duration (becomes the new baseline)\n  preds <id> [csv]                   Set predecessors (empty clears)\n  offset <id> <days>                 Set manual start offset in calendar days\n  delete <id>                        Delete a task\n  move <id> <position>               Move a task to a 1-based list position\n  vdd                                Enable and inject the VDD workstream\n  boundary <id|none>                 Set the compression block boundary task\n  compress [marketing|-] [signing|-] Fit durations to target dates (no args resets)\n  absence <name> <start> <end>       Record a key-person absence\n  conflicts                          List tasks overlapping absences\n  summary                            Show schedule summary\n  save <json|csv|sqlite> <path>      Save project\n  load <json|csv|sqlite> <path>      Load project\n  export <path>                      Export scheduled timeline as CSV\n  compute                            Recompute the schedule\n  quit|exit                          Exit"
    );
}

fn save_project(project: &Project, format: &str, path: &str) -> Result<(), String> {
    let result = match format {
        "json" => persistence::save_project_to_json(project, path),
        "csv" => persistence::save_project_to_csv(project, path),
        #[cfg(feature = "sqlite")]
        "sqlite" => persistence::SqliteProjectStore::new(path)
            .and_then(|store| store.save_project(project)),
        other => return Err(format!("Unsupported format '{other}'")),
    };
    result.map_err(|err| err.to_string())
}

fn load_project(format: &str, path: &str) -> Result<Project, String> {
    let result = match format {
        "json" => persistence::load_project_from_json(path),
        "csv" => persistence::load_project_from_csv(path),
        #[cfg(feature = "sqlite")]
        "sqlite" => persistence::SqliteProjectStore::new(path).and_then(|store| {
            store
                .load_project()?
                .ok_or(persistence::PersistenceError::NotFound)
        }),
        other => return Err(format!("Unsupported format '{other}'")),
    };
    result.map_err(|err| err.to_string())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Config error: {err}; using defaults");
            EngineConfig::default()
        }
    };
    let critical_ratio = config.critical_ratio;
    let engine = TimelineEngine::new(config);
    let mut project = Project::new("Untitled Project", Local::now().date_naive());
    let mut absences: Vec<Absence> = Vec::new();

    println!("Timeline Engine (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts[0];
        let arg = |idx: usize| parts.get(idx).copied();
        let rest = |idx: usize| parts.get(idx..).map(|p| p.join(" ")).unwrap_or_default();

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_project(&project, critical_ratio)),
            "compute" => {
                project = engine.schedule(&project);
                println!(
                    "Recomputed ({})\n{}",
                    engine.summarize(&project).to_cli_summary(),
                    render_project(&project, critical_ratio)
                );
            }
            "summary" => println!("{}", engine.summarize(&project).to_cli_summary()),
            "template" => {
                let name = rest(1);
                if name.is_empty() {
                    for template in ProjectTemplate::variants() {
                        println!("  {} ({})", template.name(), template.key());
                    }
                    continue;
                }
                let template = ProjectTemplate::lookup(&name);
                let mut fresh = template.build(project.start_date);
                fresh.jurisdictions = project.jurisdictions.clone();
                fresh.custom_holidays = project.custom_holidays.clone();
                project = engine.schedule(&fresh);
                println!(
                    "Loaded template {}.\n{}",
                    template,
                    render_project(&project, critical_ratio)
                );
            }
            "start" => match arg(1).and_then(parse_date) {
                Some(date) => {
                    project.start_date = date;
                    project = engine.schedule(&project);
                    println!("Start date set to {date}.");
                }
                None => println!("Usage: start <YYYY-MM-DD>"),
            },
            "country" => match arg(1) {
                Some(codes) => {
                    let codes = parse_pred_list(codes);
                    if codes.is_empty() {
                        println!("Usage: country <codes_csv>");
                        continue;
                    }
                    project.jurisdictions = codes;
                    project = engine.schedule(&project);
                    println!("Jurisdictions set to {}.", project.jurisdictions.join(","));
                }
                None => println!("Usage: country <codes_csv>"),
            },
            "add" => {
                let (Some(id), Some(weeks_s)) = (arg(1), arg(2)) else {
                    println!("Usage: add <id> <weeks> <name...>");
                    continue;
                };
                let weeks: f64 = match weeks_s.parse() {
                    Ok(v) if v.is_finite() && v >= 0.0 => v,
                    _ => {
                        println!("Invalid weeks");
                        continue;
                    }
                };
                let phase = project
                    .tasks
                    .last()
                    .map(|t| t.phase.clone())
                    .unwrap_or_else(|| "Phase 1: Preparation".to_string());
                match project.create_task(Task::new(id, rest(3), phase, weeks)) {
                    Ok(()) => {
                        project = engine.schedule(&project);
                        println!("Task {id} added.\n{}", render_project(&project, critical_ratio));
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "rename" | "phase" | "type" | "dur" | "preds" | "offset" => {
                let Some(id) = arg(1) else {
                    println!("Usage: {cmd} <id> <value>");
                    continue;
                };
                let value = rest(2);
                let Some(task) = project.get_task_mut(id) else {
                    println!("Error: task {id} not found");
                    continue;
                };
                let applied: Result<(), String> = match cmd {
                    "rename" => {
                        task.name = value;
                        Ok(())
                    }
                    "phase" => {
                        task.phase = value;
                        Ok(())
                    }
                    "type" => value.parse::<TaskType>().map(|t| task.task_type = t),
                    "dur" => match value.parse::<f64>() {
                        Ok(weeks) if weeks.is_finite() && weeks >= 0.0 => {
                            task.set_duration_weeks(weeks);
                            Ok(())
                        }
                        _ => Err(format!("invalid weeks '{value}'")),
                    },
                    "preds" => {
                        task.predecessors = parse_pred_list(&value);
                        Ok(())
                    }
                    _ => value
                        .parse::<i64>()
                        .map(|days| task.manual_start_offset = days)
                        .map_err(|_| format!("invalid offset '{value}'")),
                };
                match applied {
                    Ok(()) => {
                        project = engine.schedule(&project);
                        println!("{cmd} set for {id}.\n{}", render_project(&project, critical_ratio));
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "delete" => match arg(1) {
                Some(id) => match project.delete_task(id) {
                    Ok(_) => {
                        project = engine.schedule(&project);
                        println!("Deleted task {id}.");
                    }
                    Err(e) => println!("Error: {e}"),
                },
                None => println!("Usage: delete <id>"),
            },
            "move" => {
                let position = arg(2).and_then(|p| p.parse::<usize>().ok());
                match (arg(1), position) {
                    (Some(id), Some(position)) if position >= 1 => {
                        match project.move_task(id, position - 1) {
                            Ok(()) => {
                                project = engine.schedule(&project);
                                println!(
                                    "Moved task {id} to position {position}.\n{}",
                                    render_project(&project, critical_ratio)
                                );
                            }
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: move <id> <position>"),
                }
            }
            "vdd" => {
                project.vdd_enabled = true;
                let before = project.tasks.len();
                project = engine.schedule(&engine.inject_workstream(&project));
                if project.tasks.len() > before {
                    println!("VDD workstream injected.\n{}", render_project(&project, critical_ratio));
                } else {
                    println!("VDD workstream already present.");
                }
            }
            "boundary" => match arg(1) {
                Some("none") => {
                    project.block_boundary = None;
                    println!("Block boundary cleared; using phase labels.");
                }
                Some(id) if project.has_task(id) => {
                    project.block_boundary = Some(id.to_string());
                    println!("Block boundary set to {id}.");
                }
                Some(id) => println!("Error: task {id} not found"),
                None => println!("Usage: boundary <id|none>"),
            },
            "compress" => {
                let dates = parse_optional_date(arg(1))
                    .and_then(|m| parse_optional_date(arg(2)).map(|s| (m, s)));
                match dates {
                    Ok((marketing, signing)) => {
                        let (compressed, report) =
                            engine.compress_with_report(&project, marketing, signing);
                        project = compressed;
                        let fmt_ratio = |r: Option<f64>| {
                            r.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
                        };
                        println!(
                            "Compressed (block1={}, block2={})\n{}",
                            fmt_ratio(report.block_one_ratio),
                            fmt_ratio(report.block_two_ratio),
                            render_project(&project, critical_ratio)
                        );
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            "absence" => {
                let start = arg(2).and_then(parse_date);
                let end = arg(3).and_then(parse_date);
                match (arg(1), start, end) {
                    (Some(name), Some(start), Some(end)) => match Absence::new(name, start, end) {
                        Ok(absence) => {
                            println!("Absence of {} recorded.", absence.name);
                            absences.push(absence);
                        }
                        Err(e) => println!("Error: {e}"),
                    },
                    _ => println!("Usage: absence <name> <YYYY-MM-DD> <YYYY-MM-DD>"),
                }
            }
            "conflicts" => {
                let conflicts = find_absence_conflicts(&project, &absences);
                if conflicts.is_empty() {
                    println!("No conflicts.");
                }
                for conflict in conflicts {
                    println!("WARNING: {}", conflict.message());
                }
            }
            "save" => match (arg(1), arg(2)) {
                (Some(format), Some(path)) => match save_project(&project, format, path) {
                    Ok(()) => println!("Project saved to {path}."),
                    Err(e) => println!("Save error: {e}"),
                },
                _ => println!("Usage: save <json|csv|sqlite> <path>"),
            },
            "load" => match (arg(1), arg(2)) {
                (Some(format), Some(path)) => match load_project(format, path) {
                    Ok(loaded) => {
                        project = engine.schedule(&loaded);
                        println!(
                            "Project loaded from {path}.\n{}",
                            render_project(&project, critical_ratio)
                        );
                    }
                    Err(e) => println!("Load error: {e}"),
                },
                _ => println!("Usage: load <json|csv|sqlite> <path>"),
            },
            "export" => match arg(1) {
                Some(path) => match persistence::export_timeline_csv(&project, critical_ratio, path) {
                    Ok(()) => println!("Timeline exported to {path}."),
                    Err(e) => println!("Export error: {e}"),
                },
                None => println!("Usage: export <path>"),
            },
            other => println!("Unknown command '{other}'. Type 'help'."),
        }
    }
}
