//! Key-person absences and the tasks they put at risk.

use crate::project::Project;
use crate::task::TaskType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbsenceError {
    #[error("absence needs a person name")]
    MissingName,
    #[error("absence of {name} ends ({end}) before it starts ({start})")]
    EndsBeforeStart {
        name: String,
        start: NaiveDate,
        end: NaiveDate,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Absence {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Absence {
    pub fn new(
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, AbsenceError> {
        let absence = Self {
            name: name.into(),
            start,
            end,
        };
        absence.validate()?;
        Ok(absence)
    }

    pub fn validate(&self) -> Result<(), AbsenceError> {
        if self.name.trim().is_empty() {
            return Err(AbsenceError::MissingName);
        }
        if self.end < self.start {
            return Err(AbsenceError::EndsBeforeStart {
                name: self.name.clone(),
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Open-interval overlap: touching endpoints do not conflict.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start.max(self.start) < end.min(self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceConflict {
    pub task_id: String,
    pub task_name: String,
    pub task_type: TaskType,
    pub person: String,
    pub absence_start: NaiveDate,
    pub absence_end: NaiveDate,
}

impl AbsenceConflict {
    pub fn message(&self) -> String {
        format!(
            "{} task '{}' overlaps with absence of '{}' ({} to {})",
            self.task_type, self.task_name, self.person, self.absence_start, self.absence_end
        )
    }
}

/// Every scheduled Bottleneck or Key Decision task that overlaps an absence,
/// grouped by absence in the order given.
pub fn find_absence_conflicts(project: &Project, absences: &[Absence]) -> Vec<AbsenceConflict> {
    let mut conflicts = Vec::new();
    for absence in absences {
        for task in &project.tasks {
            if !task.task_type.needs_key_people() {
                continue;
            }
            let (Some(start), Some(end)) = (task.computed_start, task.computed_end) else {
                continue;
            };
            if absence.overlaps(start, end) {
                conflicts.push(AbsenceConflict {
                    task_id: task.id.clone(),
                    task_name: task.name.clone(),
                    task_type: task.task_type,
                    person: absence.name.clone(),
                    absence_start: absence.start,
                    absence_end: absence.end,
                });
            }
        }
    }
    if !conflicts.is_empty() {
        tracing::debug!(count = conflicts.len(), "absence conflicts found");
    }
    conflicts
}
