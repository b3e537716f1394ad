use super::{PersistenceError, PersistenceResult};
use crate::project::{Project, ProjectSettings};
use crate::task::{Task, TaskType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

pub fn save_project_to_json<P: AsRef<Path>>(project: &Project, path: P) -> PersistenceResult<()> {
    super::validate_project(project)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, project)?;
    Ok(())
}

pub fn load_project_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Project> {
    let file = File::open(path)?;
    let project: Project = serde_json::from_reader(file)?;
    super::validate_project(&project)?;
    Ok(project)
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    name: String,
    phase: String,
    duration_weeks: f64,
    original_duration_weeks: f64,
    compression_ratio: f64,
    predecessors: String,
    #[serde(rename = "type")]
    task_type: String,
    manual_start_offset: i64,
    computed_start: String,
    computed_end: String,
    #[serde(default)]
    settings_json: String,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            phase: task.phase.clone(),
            duration_weeks: task.duration_weeks,
            original_duration_weeks: task.original_duration_weeks,
            compression_ratio: task.compression_ratio,
            predecessors: task.predecessors.join(","),
            task_type: task.task_type.as_str().to_string(),
            manual_start_offset: task.manual_start_offset,
            computed_start: format_date(task.computed_start),
            computed_end: format_date(task.computed_end),
            settings_json: String::new(),
        }
    }
}

impl TaskCsvRecord {
    fn settings_row(project: &Project) -> PersistenceResult<Self> {
        Ok(Self {
            name: "__settings__".to_string(),
            compression_ratio: 1.0,
            settings_json: serde_json::to_string(&project.settings())?,
            ..Self::default()
        })
    }

    fn is_settings_row(&self) -> bool {
        !self.settings_json.trim().is_empty()
    }

    fn into_task(self) -> PersistenceResult<Task> {
        let task_type = self
            .task_type
            .parse::<TaskType>()
            .map_err(PersistenceError::InvalidData)?;
        let mut task = Task::new(self.id, self.name, self.phase, self.duration_weeks)
            .with_predecessors(split_ids(&self.predecessors))
            .with_type(task_type)
            .with_offset(self.manual_start_offset);
        task.original_duration_weeks = self.original_duration_weeks;
        task.compression_ratio = self.compression_ratio;
        task.computed_start = parse_date(&self.computed_start)?;
        task.computed_end = parse_date(&self.computed_end)?;
        Ok(task)
    }
}

/// Write the editable project: one settings row, then one row per task in list order.
pub fn save_project_to_csv<P: AsRef<Path>>(project: &Project, path: P) -> PersistenceResult<()> {
    super::validate_project(project)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.serialize(TaskCsvRecord::settings_row(project)?)?;
    for task in &project.tasks {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_project_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Project> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut settings: Option<ProjectSettings> = None;
    let mut tasks = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        let record = record?;
        if record.is_settings_row() {
            if settings.is_some() {
                return Err(PersistenceError::InvalidData(
                    "CSV file contained multiple settings rows".into(),
                ));
            }
            settings = Some(serde_json::from_str(&record.settings_json).map_err(|err| {
                PersistenceError::InvalidData(format!("invalid settings json: {err}"))
            })?);
            continue;
        }
        tasks.push(record.into_task()?);
    }

    let settings = settings.ok_or_else(|| {
        PersistenceError::InvalidData("CSV file is missing its settings row".into())
    })?;
    let project = Project::from_settings(settings, tasks);
    super::validate_project(&project)?;
    Ok(project)
}

#[derive(Serialize)]
struct TimelineCsvRecord<'a> {
    serial_number: usize,
    id: &'a str,
    phase: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    task_type: &'static str,
    duration_weeks: f64,
    original_duration_weeks: f64,
    compression_ratio: f64,
    critically_compressed: bool,
    start: String,
    end: String,
}

/// Flat, read-only view of a scheduled project for spreadsheets.
/// Unscheduled tasks are written with empty dates.
pub fn export_timeline_csv<P: AsRef<Path>>(
    project: &Project,
    critical_ratio: f64,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for task in &project.tasks {
        writer.serialize(TimelineCsvRecord {
            serial_number: task.serial_number,
            id: &task.id,
            phase: &task.phase,
            name: &task.name,
            task_type: task.task_type.as_str(),
            duration_weeks: round_weeks(task.duration_weeks),
            original_duration_weeks: round_weeks(task.original_duration_weeks),
            compression_ratio: round_weeks(task.compression_ratio),
            critically_compressed: task.is_critically_compressed(critical_ratio),
            start: format_date(task.computed_start),
            end: format_date(task.computed_end),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn round_weeks(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(input: &str) -> PersistenceResult<Option<NaiveDate>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn split_ids(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}
