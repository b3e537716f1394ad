use chrono::NaiveDate;
use timeline_engine::calculations::{Block, BlockPartition};
use timeline_engine::{
    EngineConfig, Project, Task, TaskType, TimelineEngine, compress_project, schedule_project,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const PREP: &str = "Phase 1: Preparation";
const MARKETING: &str = "Phase 2: Marketing";

/// Two one-week preparation tasks and a two-week marketing task, starting
/// Monday 2024-03-04. Block one ends 2024-03-18, ten business days in.
fn sample_project() -> Project {
    let mut project = Project::new("Compression", d(2024, 3, 4));
    project.add_task(Task::new("T1", "Kick-off", PREP, 1.0));
    project.add_task(Task::new("T2", "Teaser", PREP, 1.0).with_predecessors(["T1"]));
    project.add_task(Task::new("T3", "Outreach", MARKETING, 2.0).with_predecessors(["T2"]));
    project
}

fn durations(project: &Project) -> Vec<(f64, f64)> {
    project
        .tasks
        .iter()
        .map(|t| (t.duration_weeks, t.compression_ratio))
        .collect()
}

#[test]
fn halving_block_one_flags_tasks_as_critical() {
    let compressed = compress_project(&sample_project(), Some(d(2024, 3, 11)), None);
    let config = EngineConfig::default();

    for id in ["T1", "T2"] {
        let task = compressed.get_task(id).unwrap();
        assert_eq!(task.compression_ratio, 0.5);
        assert_eq!(task.duration_weeks, 0.5);
        assert_eq!(task.original_duration_weeks, 1.0);
        assert!(task.is_critically_compressed(config.critical_ratio));
    }
    let t3 = compressed.get_task("T3").unwrap();
    assert_eq!(t3.compression_ratio, 1.0);
    assert_eq!(t3.duration_weeks, 2.0);

    // 0.5 weeks is two working days each
    assert_eq!(compressed.get_task("T1").unwrap().computed_end, Some(d(2024, 3, 6)));
    assert_eq!(compressed.get_task("T2").unwrap().computed_end, Some(d(2024, 3, 8)));
}

#[test]
fn compression_report_carries_ratios() {
    let engine = TimelineEngine::default();
    let (_, report) =
        engine.compress_with_report(&sample_project(), Some(d(2024, 3, 11)), Some(d(2024, 3, 15)));
    assert_eq!(report.block_one_ratio, Some(0.5));
    assert_eq!(report.block_two_ratio, Some(0.5));
}

#[test]
fn block_two_fits_between_its_start_and_signing() {
    let compressed = compress_project(&sample_project(), None, Some(d(2024, 3, 25)));
    let t3 = compressed.get_task("T3").unwrap();
    assert_eq!(t3.compression_ratio, 0.5);
    assert_eq!(t3.duration_weeks, 1.0);
    assert_eq!(t3.computed_start, Some(d(2024, 3, 18)));
    assert_eq!(t3.computed_end, Some(d(2024, 3, 25)));
    assert_eq!(compressed.get_task("T1").unwrap().compression_ratio, 1.0);
}

#[test]
fn block_two_uses_block_one_result() {
    let compressed =
        compress_project(&sample_project(), Some(d(2024, 3, 11)), Some(d(2024, 3, 15)));
    let t3 = compressed.get_task("T3").unwrap();
    assert_eq!(t3.computed_start, Some(d(2024, 3, 8)));
    assert_eq!(t3.computed_end, Some(d(2024, 3, 15)));
    assert_eq!(t3.duration_weeks, 1.0);
}

#[test]
fn later_targets_stretch_durations() {
    let compressed = compress_project(&sample_project(), Some(d(2024, 3, 25)), None);
    let t1 = compressed.get_task("T1").unwrap();
    assert_eq!(t1.compression_ratio, 1.5);
    assert_eq!(t1.duration_weeks, 1.5);
}

#[test]
fn repeated_compression_does_not_compound() {
    let project = sample_project();
    let marketing = Some(d(2024, 3, 11));
    let signing = Some(d(2024, 3, 15));
    let once = compress_project(&project, marketing, signing);
    let twice = compress_project(&once, marketing, signing);
    assert_eq!(durations(&once), durations(&twice));
    assert_eq!(once, twice);
}

#[test]
fn compressing_without_targets_restores_baseline() {
    let compressed = compress_project(&sample_project(), Some(d(2024, 3, 11)), None);
    let restored = compress_project(&compressed, None, None);
    for task in &restored.tasks {
        assert_eq!(task.duration_weeks, task.original_duration_weeks);
        assert_eq!(task.compression_ratio, 1.0);
    }
    assert_eq!(restored, schedule_project(&sample_project()));
}

#[test]
fn targets_without_room_leave_blocks_alone() {
    let engine = TimelineEngine::default();
    // marketing on the start date gives zero available days
    let (project, report) =
        engine.compress_with_report(&sample_project(), Some(d(2024, 3, 4)), None);
    assert_eq!(report.block_one_ratio, None);
    assert!(project.tasks.iter().all(|t| t.compression_ratio == 1.0));

    // signing before block two can start
    let (project, report) =
        engine.compress_with_report(&sample_project(), None, Some(d(2024, 3, 15)));
    assert_eq!(report.block_two_ratio, None);
    assert_eq!(project.get_task("T3").unwrap().duration_weeks, 2.0);
}

#[test]
fn milestones_keep_zero_duration() {
    let mut project = sample_project();
    project.add_task(
        Task::new("M1", "Launch", PREP, 0.0)
            .with_predecessors(["T2"])
            .with_type(TaskType::Milestone),
    );
    let compressed = compress_project(&project, Some(d(2024, 3, 11)), None);
    let milestone = compressed.get_task("M1").unwrap();
    assert_eq!(milestone.duration_weeks, 0.0);
    assert_eq!(milestone.compression_ratio, 1.0);
}

#[test]
fn missing_baseline_is_captured_before_scaling() {
    let mut project = sample_project();
    project.tasks[0].original_duration_weeks = 0.0;
    let compressed = compress_project(&project, Some(d(2024, 3, 11)), None);
    let t1 = compressed.get_task("T1").unwrap();
    assert_eq!(t1.original_duration_weeks, 1.0);
    assert_eq!(t1.duration_weeks, 0.5);
}

#[test]
fn boundary_task_defines_block_one_by_ancestry() {
    let mut project = Project::new("Boundary", d(2024, 3, 4));
    project.add_task(Task::new("A", "Gather", "Groundwork", 1.0));
    project.add_task(Task::new("B", "Draft", "Groundwork", 1.0).with_predecessors(["A"]));
    project.add_task(Task::new("C", "Side work", "Groundwork", 3.0));
    project.add_task(Task::new("D", "Launch", "Launch", 2.0).with_predecessors(["B"]));

    let config = EngineConfig::default();
    // no phase contains a block-one marker
    let by_label = BlockPartition::for_project(&project, &config).classify(&project);
    assert!(by_label.iter().all(|b| *b == Block::Two));

    project.block_boundary = Some("B".into());
    let partition = BlockPartition::for_project(&project, &config);
    assert_eq!(partition, BlockPartition::Boundary("B".into()));
    assert_eq!(
        partition.classify(&project),
        vec![Block::One, Block::One, Block::Two, Block::Two]
    );

    let engine = TimelineEngine::default();
    let (compressed, report) = engine.compress_with_report(&project, Some(d(2024, 3, 11)), None);
    assert_eq!(report.block_one_ratio, Some(0.5));
    assert_eq!(compressed.get_task("A").unwrap().duration_weeks, 0.5);
    assert_eq!(compressed.get_task("C").unwrap().duration_weeks, 3.0);
}

#[test]
fn unknown_boundary_falls_back_to_phase_labels() {
    let mut project = sample_project();
    project.block_boundary = Some("NOPE".into());
    let config = EngineConfig::default();
    let partition = BlockPartition::for_project(&project, &config);
    assert!(matches!(partition, BlockPartition::PhaseMarkers(_)));
    assert_eq!(
        partition.classify(&project),
        vec![Block::One, Block::One, Block::Two]
    );
}
