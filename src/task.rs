use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marker tag used by renderers; only zero duration has a scheduling effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskType {
    #[default]
    Standard,
    Milestone,
    Bottleneck,
    #[serde(rename = "Key Decision")]
    KeyDecision,
    #[serde(rename = "External Dependency")]
    ExternalDependency,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Standard => "Standard",
            TaskType::Milestone => "Milestone",
            TaskType::Bottleneck => "Bottleneck",
            TaskType::KeyDecision => "Key Decision",
            TaskType::ExternalDependency => "External Dependency",
        }
    }

    pub fn variants() -> [TaskType; 5] {
        [
            TaskType::Standard,
            TaskType::Milestone,
            TaskType::Bottleneck,
            TaskType::KeyDecision,
            TaskType::ExternalDependency,
        ]
    }

    /// Types whose overlap with a key-person absence is worth a warning.
    pub fn needs_key_people(&self) -> bool {
        matches!(self, TaskType::Bottleneck | TaskType::KeyDecision)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "standard" => Ok(TaskType::Standard),
            "milestone" => Ok(TaskType::Milestone),
            "bottleneck" => Ok(TaskType::Bottleneck),
            "keydecision" => Ok(TaskType::KeyDecision),
            "externaldependency" => Ok(TaskType::ExternalDependency),
            _ => Err(format!("unknown task type '{s}'")),
        }
    }
}

fn default_ratio() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub phase: String,
    pub duration_weeks: f64,
    #[serde(default)]
    pub original_duration_weeks: f64,
    #[serde(default = "default_ratio")]
    pub compression_ratio: f64,
    #[serde(default)]
    pub predecessors: Vec<String>,
    #[serde(rename = "type", default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub manual_start_offset: i64,
    #[serde(default)]
    pub serial_number: usize,
    #[serde(default)]
    pub computed_start: Option<NaiveDate>,
    #[serde(default)]
    pub computed_end: Option<NaiveDate>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        phase: impl Into<String>,
        duration_weeks: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phase: phase.into(),
            duration_weeks,
            original_duration_weeks: duration_weeks,
            compression_ratio: 1.0,
            predecessors: Vec::new(),
            task_type: TaskType::Standard,
            manual_start_offset: 0,
            serial_number: 0,
            computed_start: None,
            computed_end: None,
        }
    }

    pub fn with_predecessors<I, S>(mut self, predecessors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predecessors = predecessors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    pub fn with_offset(mut self, days: i64) -> Self {
        self.manual_start_offset = days;
        self
    }

    /// A user edit of the duration: becomes the new uncompressed baseline.
    pub fn set_duration_weeks(&mut self, weeks: f64) {
        self.duration_weeks = weeks;
        self.original_duration_weeks = weeks;
        self.compression_ratio = 1.0;
    }

    /// Adopt the current duration as the baseline when none was recorded.
    pub(crate) fn ensure_baseline(&mut self) {
        if self.original_duration_weeks <= 0.0 && self.duration_weeks > 0.0 {
            self.original_duration_weeks = self.duration_weeks;
            self.compression_ratio = 1.0;
        }
    }

    pub(crate) fn clear_computed(&mut self) {
        self.computed_start = None;
        self.computed_end = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.computed_start.is_some() && self.computed_end.is_some()
    }

    pub fn is_marker(&self) -> bool {
        self.duration_weeks == 0.0
    }

    pub fn is_critically_compressed(&self, threshold: f64) -> bool {
        self.compression_ratio <= threshold
    }
}
