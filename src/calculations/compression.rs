use crate::calculations::forward_pass::ForwardPass;
use crate::calendar::WorkCalendar;
use crate::config::EngineConfig;
use crate::graph::DependencyGraph;
use crate::project::Project;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Compression block a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    /// Preparation work, fitted between project start and the marketing launch.
    One,
    /// Everything else, fitted to end at signing.
    Two,
}

/// How tasks are split into the two compression blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockPartition {
    /// Block one holds every task whose phase contains one of the markers.
    PhaseMarkers(Vec<String>),
    /// Block one holds the boundary task and all of its transitive predecessors.
    Boundary(String),
}

impl BlockPartition {
    pub fn for_project(project: &Project, config: &EngineConfig) -> Self {
        match &project.block_boundary {
            Some(boundary) if project.has_task(boundary) => Self::Boundary(boundary.clone()),
            Some(boundary) => {
                tracing::warn!(
                    boundary = %boundary,
                    "block boundary task not found; partitioning by phase labels"
                );
                Self::PhaseMarkers(config.block_one_markers.clone())
            }
            None => Self::PhaseMarkers(config.block_one_markers.clone()),
        }
    }

    /// One entry per task, in list order.
    pub fn classify(&self, project: &Project) -> Vec<Block> {
        match self {
            Self::PhaseMarkers(markers) => project
                .tasks
                .iter()
                .map(|task| {
                    if markers.iter().any(|m| task.phase.contains(m.as_str())) {
                        Block::One
                    } else {
                        Block::Two
                    }
                })
                .collect(),
            Self::Boundary(boundary) => {
                let block_one: HashSet<String> =
                    DependencyGraph::build(&project.tasks).ancestors(boundary);
                project
                    .tasks
                    .iter()
                    .map(|task| {
                        if block_one.contains(&task.id) {
                            Block::One
                        } else {
                            Block::Two
                        }
                    })
                    .collect()
            }
        }
    }
}

/// Ratios applied by a compression run; `None` for a block that was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompressionReport {
    pub block_one_ratio: Option<f64>,
    pub block_two_ratio: Option<f64>,
}

/// Two-block elastic rescaling of task durations towards target dates.
///
/// Scaling always starts from `original_duration_weeks`, so repeated runs
/// with the same targets give the same durations.
pub struct Compression<'a> {
    calendar: &'a WorkCalendar,
    config: &'a EngineConfig,
}

impl<'a> Compression<'a> {
    pub fn new(calendar: &'a WorkCalendar, config: &'a EngineConfig) -> Self {
        Self { calendar, config }
    }

    pub fn execute(
        &self,
        project: &mut Project,
        marketing_date: Option<NaiveDate>,
        signing_date: Option<NaiveDate>,
    ) -> CompressionReport {
        Self::reset(project);
        let scheduler = ForwardPass::new(self.calendar, self.config);
        let mut report = CompressionReport::default();

        if marketing_date.is_none() && signing_date.is_none() {
            scheduler.execute(project);
            return report;
        }

        let blocks = BlockPartition::for_project(project, self.config).classify(project);

        if let Some(marketing_date) = marketing_date {
            let mut baseline = project.clone();
            scheduler.execute(&mut baseline);

            let block_end = baseline
                .tasks
                .iter()
                .zip(&blocks)
                .filter(|(_, block)| **block == Block::One)
                .filter_map(|(task, _)| task.computed_end)
                .max();

            if let Some(block_end) = block_end {
                let available = self
                    .calendar
                    .business_days_between(project.start_date, marketing_date);
                let standard = self
                    .calendar
                    .business_days_between(project.start_date, block_end);
                report.block_one_ratio =
                    Self::scale_block(project, &blocks, Block::One, available, standard);
            }
        }

        if let Some(signing_date) = signing_date {
            let mut interim = project.clone();
            scheduler.execute(&mut interim);

            let block_two = || {
                interim
                    .tasks
                    .iter()
                    .zip(&blocks)
                    .filter(|(_, block)| **block == Block::Two)
                    .map(|(task, _)| task)
            };
            let block_start = block_two().filter_map(|t| t.computed_start).min();
            let block_end = block_two().filter_map(|t| t.computed_end).max();

            match (block_start, block_end) {
                (Some(block_start), Some(block_end)) if block_start < signing_date => {
                    let available = self
                        .calendar
                        .business_days_between(block_start, signing_date);
                    let standard = self.calendar.business_days_between(block_start, block_end);
                    report.block_two_ratio =
                        Self::scale_block(project, &blocks, Block::Two, available, standard);
                }
                (Some(block_start), Some(_)) => {
                    tracing::debug!(
                        %block_start,
                        %signing_date,
                        "block two starts on or after signing; leaving it uncompressed"
                    );
                }
                _ => {}
            }
        }

        scheduler.execute(project);
        report
    }

    /// Restore every task with a baseline to its uncompressed duration.
    fn reset(project: &mut Project) {
        for task in &mut project.tasks {
            task.ensure_baseline();
            if task.original_duration_weeks > 0.0 {
                task.duration_weeks = task.original_duration_weeks;
                task.compression_ratio = 1.0;
            }
        }
    }

    fn scale_block(
        project: &mut Project,
        blocks: &[Block],
        target: Block,
        available_days: i64,
        standard_days: i64,
    ) -> Option<f64> {
        if available_days <= 0 || standard_days <= 0 {
            tracing::debug!(
                ?target,
                available_days,
                standard_days,
                "no business days to scale against; block left uncompressed"
            );
            return None;
        }

        let ratio = available_days as f64 / standard_days as f64;
        for (task, block) in project.tasks.iter_mut().zip(blocks) {
            if *block == target && task.duration_weeks > 0.0 {
                task.duration_weeks = task.original_duration_weeks * ratio;
                task.compression_ratio = ratio;
            }
        }
        tracing::info!(
            ?target,
            ratio,
            available_days,
            standard_days,
            "rescaled block durations"
        );
        Some(ratio)
    }
}
