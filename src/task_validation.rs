use crate::project::Project;
use crate::task::Task;
use std::collections::HashSet;
use thiserror::Error;

/// Longest task accepted at a storage or API boundary, in weeks.
pub const MAX_DURATION_WEEKS: f64 = 5_200.0;

/// Largest manual start offset accepted at a boundary, in calendar days either way.
pub const MAX_START_OFFSET_DAYS: u64 = 36_500;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskValidationError {
    #[error("task id must not be empty")]
    EmptyId,
    #[error("duplicate task id {0}")]
    DuplicateId(String),
    #[error("task {id} has invalid duration_weeks {value}")]
    InvalidDuration { id: String, value: f64 },
    #[error("task {id} has manual_start_offset {value} outside ±{max} days", max = MAX_START_OFFSET_DAYS)]
    InvalidOffset { id: String, value: i64 },
    #[error("task {id} has invalid original_duration_weeks {value}")]
    InvalidBaseline { id: String, value: f64 },
    #[error("task {id} has invalid compression_ratio {value} (must be positive)")]
    InvalidRatio { id: String, value: f64 },
    #[error("project needs at least one jurisdiction code")]
    NoJurisdictions,
}

pub fn validate_task(task: &Task) -> Result<(), TaskValidationError> {
    if task.id.trim().is_empty() {
        return Err(TaskValidationError::EmptyId);
    }
    if !is_valid_weeks(task.duration_weeks) {
        return Err(TaskValidationError::InvalidDuration {
            id: task.id.clone(),
            value: task.duration_weeks,
        });
    }
    if !is_valid_weeks(task.original_duration_weeks) {
        return Err(TaskValidationError::InvalidBaseline {
            id: task.id.clone(),
            value: task.original_duration_weeks,
        });
    }
    if task.manual_start_offset.unsigned_abs() > MAX_START_OFFSET_DAYS {
        return Err(TaskValidationError::InvalidOffset {
            id: task.id.clone(),
            value: task.manual_start_offset,
        });
    }
    if !task.compression_ratio.is_finite() || task.compression_ratio <= 0.0 {
        return Err(TaskValidationError::InvalidRatio {
            id: task.id.clone(),
            value: task.compression_ratio,
        });
    }
    Ok(())
}

fn is_valid_weeks(weeks: f64) -> bool {
    weeks.is_finite() && (0.0..=MAX_DURATION_WEEKS).contains(&weeks)
}

pub fn validate_task_collection(tasks: &[Task]) -> Result<(), TaskValidationError> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        validate_task(task)?;
        if !seen_ids.insert(task.id.as_str()) {
            return Err(TaskValidationError::DuplicateId(task.id.clone()));
        }
    }
    Ok(())
}

/// Checks applied wherever a project crosses a storage or API boundary.
/// Dangling predecessors and cycles are allowed; the scheduler tolerates them.
pub fn validate_project(project: &Project) -> Result<(), TaskValidationError> {
    if project.jurisdictions.iter().all(|code| code.trim().is_empty()) {
        return Err(TaskValidationError::NoJurisdictions);
    }
    validate_task_collection(&project.tasks)
}
