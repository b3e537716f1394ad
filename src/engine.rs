//! Snapshot-in, snapshot-out entry points.
//!
//! Every operation clones the incoming project, works on the clone and
//! returns it, so callers never observe a half-computed task list.

use crate::calculations::{Compression, CompressionReport, ForwardPass, PassReport};
use crate::calendar::WorkCalendar;
use crate::config::EngineConfig;
use crate::project::Project;
use crate::summary::ScheduleSummary;
use crate::workstream;
use chrono::NaiveDate;

#[derive(Debug, Clone, Default)]
pub struct TimelineEngine {
    config: EngineConfig,
}

impl TimelineEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute start and end dates for every task that can be resolved.
    pub fn schedule(&self, project: &Project) -> Project {
        self.schedule_with_report(project).0
    }

    pub fn schedule_with_report(&self, project: &Project) -> (Project, PassReport) {
        let mut scheduled = project.clone();
        let calendar = self.calendar_for(&scheduled);
        let report = ForwardPass::new(&calendar, &self.config).execute(&mut scheduled);
        tracing::debug!(
            project = %scheduled.name,
            passes = report.passes,
            scheduled = report.scheduled,
            "schedule computed"
        );
        (scheduled, report)
    }

    /// Rescale durations so block one ends at `marketing_date` and block two
    /// at `signing_date`. Without either date this restores the baseline.
    pub fn compress(
        &self,
        project: &Project,
        marketing_date: Option<NaiveDate>,
        signing_date: Option<NaiveDate>,
    ) -> Project {
        self.compress_with_report(project, marketing_date, signing_date)
            .0
    }

    pub fn compress_with_report(
        &self,
        project: &Project,
        marketing_date: Option<NaiveDate>,
        signing_date: Option<NaiveDate>,
    ) -> (Project, CompressionReport) {
        let mut compressed = project.clone();
        let calendar = self.calendar_for(&compressed);
        let report = Compression::new(&calendar, &self.config).execute(
            &mut compressed,
            marketing_date,
            signing_date,
        );
        (compressed, report)
    }

    /// Add the due-diligence workstream if enabled and not yet present.
    /// The returned project is not rescheduled.
    pub fn inject_workstream(&self, project: &Project) -> Project {
        let mut injected = project.clone();
        workstream::inject(&mut injected);
        injected
    }

    pub fn summarize(&self, project: &Project) -> ScheduleSummary {
        ScheduleSummary::from_project(project, &self.config)
    }

    /// Project holidays over a week as long as the configured duration week.
    pub fn calendar_for(&self, project: &Project) -> WorkCalendar {
        let mut calendar = WorkCalendar::for_project(project);
        calendar.set_week_length(self.config.workdays_per_week);
        calendar
    }
}

/// [`TimelineEngine::schedule`] with the default configuration.
pub fn schedule_project(project: &Project) -> Project {
    TimelineEngine::default().schedule(project)
}

/// [`TimelineEngine::compress`] with the default configuration.
pub fn compress_project(
    project: &Project,
    marketing_date: Option<NaiveDate>,
    signing_date: Option<NaiveDate>,
) -> Project {
    TimelineEngine::default().compress(project, marketing_date, signing_date)
}

/// [`TimelineEngine::inject_workstream`] with the default configuration.
pub fn inject_workstream(project: &Project) -> Project {
    TimelineEngine::default().inject_workstream(project)
}
