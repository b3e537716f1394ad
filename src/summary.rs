use crate::config::EngineConfig;
use crate::graph::DependencyGraph;
use crate::project::Project;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub task_count: usize,
    pub scheduled_count: usize,
    pub unscheduled: Vec<String>,
    pub earliest_start: Option<NaiveDate>,
    pub latest_finish: Option<NaiveDate>,
    /// Ids of tasks at or below the configured critical compression ratio.
    pub critically_compressed: Vec<String>,
    pub cycles: Vec<Vec<String>>,
}

impl ScheduleSummary {
    /// Summarise a project as last scheduled. Nothing is recomputed.
    pub fn from_project(project: &Project, config: &EngineConfig) -> Self {
        let unscheduled: Vec<String> = project
            .tasks
            .iter()
            .filter(|t| !t.is_scheduled())
            .map(|t| t.id.clone())
            .collect();
        let critically_compressed = project
            .tasks
            .iter()
            .filter(|t| t.is_critically_compressed(config.critical_ratio))
            .map(|t| t.id.clone())
            .collect();

        Self {
            task_count: project.tasks.len(),
            scheduled_count: project.tasks.len() - unscheduled.len(),
            unscheduled,
            earliest_start: project.earliest_start(),
            latest_finish: project.latest_finish(),
            critically_compressed,
            cycles: DependencyGraph::build(&project.tasks).cycles(),
        }
    }

    pub fn is_fully_scheduled(&self) -> bool {
        self.unscheduled.is_empty()
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.task_count));
        parts.push(format!("scheduled={}", self.scheduled_count));
        if let Some(date) = self.earliest_start {
            parts.push(format!("start={}", date));
        }
        if let Some(date) = self.latest_finish {
            parts.push(format!("finish={}", date));
        }
        if !self.unscheduled.is_empty() {
            parts.push(format!("unscheduled={}", self.unscheduled.join("|")));
        }
        if !self.critically_compressed.is_empty() {
            parts.push(format!(
                "critical={}",
                self.critically_compressed.join("|")
            ));
        }
        for cycle in &self.cycles {
            parts.push(format!("cycle={}", cycle.join("->")));
        }
        parts.join(", ")
    }
}
