use chrono::NaiveDate;
use timeline_engine::{
    Absence, AbsenceError, EngineConfig, Project, ScheduleSummary, Task, TaskType,
    TimelineEngine, compress_project, find_absence_conflicts, schedule_project,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn review_project() -> Project {
    let mut project = Project::new("Review", d(2024, 3, 4));
    project.add_task(Task::new("A", "Prep", "Phase 1: Preparation", 1.0));
    project.add_task(
        Task::new("B", "Management Presentations", "Phase 2", 1.0)
            .with_predecessors(["A"])
            .with_type(TaskType::Bottleneck),
    );
    project.add_task(
        Task::new("C", "Offer Decision", "Phase 2", 1.0)
            .with_predecessors(["B"])
            .with_type(TaskType::KeyDecision),
    );
    project.add_task(Task::new("D", "Paperwork", "Phase 2", 1.0).with_predecessors(["B"]));
    project
}

#[test]
fn summary_reports_span_and_flags() {
    let compressed = compress_project(&review_project(), Some(d(2024, 3, 6)), None);
    let summary = TimelineEngine::default().summarize(&compressed);
    assert_eq!(summary.task_count, 4);
    assert_eq!(summary.scheduled_count, 4);
    assert!(summary.is_fully_scheduled());
    assert_eq!(summary.earliest_start, Some(d(2024, 3, 4)));
    // block one squeezed from five days to two
    assert_eq!(summary.critically_compressed, vec!["A".to_string()]);
    assert!(summary.cycles.is_empty());

    let line = summary.to_cli_summary();
    assert!(line.starts_with("tasks=4, scheduled=4, start=2024-03-04"));
    assert!(line.contains("critical=A"));
}

#[test]
fn summary_lists_unscheduled_tasks_and_cycles() {
    let mut project = review_project();
    project.add_task(Task::new("X", "Loop 1", "Phase 2", 1.0).with_predecessors(["Y"]));
    project.add_task(Task::new("Y", "Loop 2", "Phase 2", 1.0).with_predecessors(["X"]));
    let scheduled = schedule_project(&project);
    let summary = ScheduleSummary::from_project(&scheduled, &EngineConfig::default());
    assert_eq!(summary.unscheduled, vec!["X".to_string(), "Y".to_string()]);
    assert_eq!(summary.cycles, vec![vec!["X".to_string(), "Y".to_string()]]);
    assert!(summary.to_cli_summary().contains("cycle=X->Y"));
}

#[test]
fn absences_overlapping_key_tasks_are_reported() {
    let scheduled = schedule_project(&review_project());
    // B runs 2024-03-11..2024-03-18, C runs 2024-03-18..2024-03-25
    let absences = vec![
        Absence::new("Alice", d(2024, 3, 12), d(2024, 3, 13)).unwrap(),
        Absence::new("Bob", d(2024, 3, 25), d(2024, 3, 29)).unwrap(),
        Absence::new("Carol", d(2024, 3, 1), d(2024, 3, 8)).unwrap(),
    ];
    let conflicts = find_absence_conflicts(&scheduled, &absences);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].task_id, "B");
    assert_eq!(conflicts[0].person, "Alice");
    assert!(conflicts[0].message().contains("Management Presentations"));
}

#[test]
fn absence_spanning_several_tasks_hits_each_key_task() {
    let scheduled = schedule_project(&review_project());
    let absences = vec![Absence::new("Dana", d(2024, 3, 4), d(2024, 3, 29)).unwrap()];
    let ids: Vec<String> = find_absence_conflicts(&scheduled, &absences)
        .into_iter()
        .map(|c| c.task_id)
        .collect();
    // A and D are standard tasks and never conflict
    assert_eq!(ids, vec!["B".to_string(), "C".to_string()]);
}

#[test]
fn unscheduled_tasks_never_conflict() {
    let absences = vec![Absence::new("Eve", d(2024, 1, 1), d(2024, 12, 31)).unwrap()];
    assert!(find_absence_conflicts(&review_project(), &absences).is_empty());
}

#[test]
fn invalid_absences_are_rejected() {
    assert_eq!(
        Absence::new(" ", d(2024, 3, 1), d(2024, 3, 2)).unwrap_err(),
        AbsenceError::MissingName
    );
    assert!(matches!(
        Absence::new("Frank", d(2024, 3, 5), d(2024, 3, 1)),
        Err(AbsenceError::EndsBeforeStart { .. })
    ));
}
