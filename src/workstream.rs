//! Optional vendor due-diligence (VDD) workstream.
//!
//! Injection is structural and happens once: the sentinel task marks a
//! project that already carries the workstream.

use crate::project::Project;
use crate::task::{Task, TaskType};

/// Id of the first injected task. Its presence makes injection a no-op.
pub const SENTINEL_ID: &str = "VDD.1";

/// Kickoff tasks the workstream hangs off, in priority order.
pub const KICKOFF_IDS: [&str; 3] = ["T1.1", "F1.1", "D1.1"];

/// Name fragment of the due-diligence task that the workstream shortens.
pub const SHORTENED_TASK_MARKER: &str = "Confirmatory Due Diligence";

pub const SHORTENED_SUFFIX: &str = " (Shortened due to VDD)";

const WORKSTREAM_PHASE: &str = "Phase 1: Preparation";
const SHORTEN_THRESHOLD_WEEKS: f64 = 3.0;
const SHORTEN_BY_WEEKS: f64 = 2.0;

fn workstream_tasks(kickoff: Option<&str>) -> Vec<Task> {
    vec![
        Task::new(
            SENTINEL_ID,
            "Selection of VDD Advisors (Financial, Legal, Tax)",
            WORKSTREAM_PHASE,
            2.0,
        )
        .with_predecessors(kickoff)
        .with_type(TaskType::KeyDecision),
        Task::new("VDD.2", "Financial VDD Execution", WORKSTREAM_PHASE, 4.0)
            .with_predecessors([SENTINEL_ID]),
        Task::new("VDD.3", "Tax & Legal VDD Execution", WORKSTREAM_PHASE, 4.0)
            .with_predecessors([SENTINEL_ID]),
        Task::new("VDD.4", "VDD Reports Draft Review", WORKSTREAM_PHASE, 2.0)
            .with_predecessors(["VDD.2", "VDD.3"])
            .with_type(TaskType::Bottleneck),
    ]
}

/// Insert the workstream into `project` in place.
///
/// Returns `false` when nothing changed: the project has `vdd_enabled`
/// unset or already contains [`SENTINEL_ID`].
pub fn inject(project: &mut Project) -> bool {
    if !project.vdd_enabled {
        tracing::debug!("workstream disabled for project; skipping injection");
        return false;
    }
    if project.has_task(SENTINEL_ID) {
        tracing::debug!("workstream already present; skipping injection");
        return false;
    }

    let kickoff = KICKOFF_IDS
        .iter()
        .find_map(|id| project.position(id).map(|idx| (*id, idx)));
    let insert_at = kickoff.map_or(0, |(_, idx)| idx + 1);
    let kickoff_id = kickoff.map(|(id, _)| id);

    project.tasks.splice(
        insert_at..insert_at,
        workstream_tasks(kickoff_id),
    );

    let shortened = project.tasks.iter_mut().find(|task| {
        task.name.contains(SHORTENED_TASK_MARKER) && task.duration_weeks > SHORTEN_THRESHOLD_WEEKS
    });
    let shortened_id = shortened.map(|task| {
        task.set_duration_weeks(task.duration_weeks - SHORTEN_BY_WEEKS);
        task.name.push_str(SHORTENED_SUFFIX);
        task.id.clone()
    });

    tracing::info!(
        kickoff = kickoff_id.unwrap_or("<none>"),
        position = insert_at,
        shortened = shortened_id.as_deref().unwrap_or("<none>"),
        "injected due-diligence workstream"
    );
    true
}
