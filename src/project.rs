use crate::task::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectError {
    #[error("task {0} not found")]
    TaskNotFound(String),
    #[error("task {0} already exists")]
    DuplicateTask(String),
    #[error("position {position} is out of range for {len} tasks")]
    PositionOutOfRange { position: usize, len: usize },
}

fn default_jurisdictions() -> Vec<String> {
    vec!["US".to_string()]
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(code) => vec![code],
        OneOrMany::Many(codes) => codes,
    })
}

/// Project-level fields without the task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(
        alias = "country",
        default = "default_jurisdictions",
        deserialize_with = "one_or_many"
    )]
    pub jurisdictions: Vec<String>,
    #[serde(default)]
    pub custom_holidays: Vec<NaiveDate>,
    #[serde(default)]
    pub vdd_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_boundary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub start_date: NaiveDate,
    /// Holiday jurisdictions; a date off in any of them is off for the project.
    #[serde(
        alias = "country",
        default = "default_jurisdictions",
        deserialize_with = "one_or_many"
    )]
    pub jurisdictions: Vec<String>,
    #[serde(default)]
    pub custom_holidays: Vec<NaiveDate>,
    #[serde(default)]
    pub vdd_enabled: bool,
    /// Task that closes compression block one. Falls back to phase labels when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_boundary: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Project {
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date,
            jurisdictions: default_jurisdictions(),
            custom_holidays: Vec::new(),
            vdd_enabled: false,
            block_boundary: None,
            tasks: Vec::new(),
        }
    }

    pub fn with_jurisdictions<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.jurisdictions = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_settings(settings: ProjectSettings, tasks: Vec<Task>) -> Self {
        Self {
            name: settings.name,
            start_date: settings.start_date,
            jurisdictions: settings.jurisdictions,
            custom_holidays: settings.custom_holidays,
            vdd_enabled: settings.vdd_enabled,
            block_boundary: settings.block_boundary,
            tasks,
        }
    }

    pub fn settings(&self) -> ProjectSettings {
        ProjectSettings {
            name: self.name.clone(),
            start_date: self.start_date,
            jurisdictions: self.jurisdictions.clone(),
            custom_holidays: self.custom_holidays.clone(),
            vdd_enabled: self.vdd_enabled,
            block_boundary: self.block_boundary.clone(),
        }
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn position(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn has_task(&self, task_id: &str) -> bool {
        self.position(task_id).is_some()
    }

    pub fn get_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn get_task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    /// Append a new task, refusing ids that are already taken.
    pub fn create_task(&mut self, task: Task) -> Result<(), ProjectError> {
        if self.has_task(&task.id) {
            return Err(ProjectError::DuplicateTask(task.id));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Replace the task with the same id in place, or append it.
    pub fn upsert_task(&mut self, task: Task) {
        match self.position(&task.id) {
            Some(idx) => self.tasks[idx] = task,
            None => self.tasks.push(task),
        }
    }

    /// Replace an existing task with an edited copy.
    ///
    /// A changed `duration_weeks` sent with the stored baseline unchanged is a
    /// user edit and becomes the new baseline, as with
    /// [`Task::set_duration_weeks`].
    pub fn update_task(&mut self, mut task: Task) -> Result<(), ProjectError> {
        let idx = self
            .position(&task.id)
            .ok_or_else(|| ProjectError::TaskNotFound(task.id.clone()))?;
        let current = &self.tasks[idx];
        if task.duration_weeks != current.duration_weeks
            && task.original_duration_weeks == current.original_duration_weeks
        {
            task.set_duration_weeks(task.duration_weeks);
        }
        self.tasks[idx] = task;
        Ok(())
    }

    /// Remove a task and drop it from every other task's predecessors.
    pub fn delete_task(&mut self, task_id: &str) -> Result<Task, ProjectError> {
        let idx = self
            .position(task_id)
            .ok_or_else(|| ProjectError::TaskNotFound(task_id.to_string()))?;
        let removed = self.tasks.remove(idx);
        for task in &mut self.tasks {
            task.predecessors.retain(|pred| pred != task_id);
        }
        Ok(removed)
    }

    /// Move a task to `new_position` (0-based) in the list.
    pub fn move_task(&mut self, task_id: &str, new_position: usize) -> Result<(), ProjectError> {
        let len = self.tasks.len();
        if new_position >= len {
            return Err(ProjectError::PositionOutOfRange {
                position: new_position,
                len,
            });
        }
        let idx = self
            .position(task_id)
            .ok_or_else(|| ProjectError::TaskNotFound(task_id.to_string()))?;
        let task = self.tasks.remove(idx);
        self.tasks.insert(new_position, task);
        Ok(())
    }

    pub fn scheduled_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.is_scheduled())
    }

    pub fn earliest_start(&self) -> Option<NaiveDate> {
        self.tasks.iter().filter_map(|t| t.computed_start).min()
    }

    pub fn latest_finish(&self) -> Option<NaiveDate> {
        self.tasks.iter().filter_map(|t| t.computed_end).max()
    }
}
