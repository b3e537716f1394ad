use crate::calendar::WorkCalendar;
use crate::config::EngineConfig;
use crate::graph::DependencyGraph;
use crate::project::Project;
use crate::task::Task;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

const WORKDAY_EPSILON: f64 = 1e-9;

/// What a scheduling run achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub passes: usize,
    pub scheduled: usize,
    /// Ids left without dates, in list order.
    pub unscheduled: Vec<String>,
}

impl PassReport {
    pub fn is_complete(&self) -> bool {
        self.unscheduled.is_empty()
    }
}

/// Fixed-point relaxation over the task list.
///
/// Each pass walks the list in order and schedules every task whose known
/// predecessors already have an end date. Runs stop after a pass without
/// progress or after `pass_multiplier * N` passes.
pub struct ForwardPass<'a> {
    calendar: &'a WorkCalendar,
    config: &'a EngineConfig,
}

impl<'a> ForwardPass<'a> {
    pub fn new(calendar: &'a WorkCalendar, config: &'a EngineConfig) -> Self {
        Self { calendar, config }
    }

    pub fn execute(&self, project: &mut Project) -> PassReport {
        for (idx, task) in project.tasks.iter_mut().enumerate() {
            task.clear_computed();
            task.serial_number = idx + 1;
        }

        let mut task_to_idx: HashMap<String, usize> = HashMap::with_capacity(project.tasks.len());
        for (idx, task) in project.tasks.iter().enumerate() {
            task_to_idx.entry(task.id.clone()).or_insert(idx);
        }

        let task_count = project.tasks.len();
        let max_passes = task_count * self.config.pass_multiplier;
        let mut scheduled = 0usize;
        let mut passes = 0usize;
        let mut out_of_range = vec![false; task_count];

        while scheduled < task_count && passes < max_passes {
            passes += 1;
            let mut progress_made = false;

            for idx in 0..task_count {
                if out_of_range[idx] || project.tasks[idx].is_scheduled() {
                    continue;
                }
                let Some(anchor) =
                    Self::resolve_anchor(&project.tasks, idx, &task_to_idx, project.start_date)
                else {
                    continue;
                };

                let task = &mut project.tasks[idx];
                let Some((start, end)) = self.place(anchor, task) else {
                    tracing::warn!(
                        task = %task.id,
                        %anchor,
                        offset = task.manual_start_offset,
                        duration_weeks = task.duration_weeks,
                        "task would end past the last representable date; leaving it unscheduled"
                    );
                    out_of_range[idx] = true;
                    continue;
                };
                task.computed_start = Some(start);
                task.computed_end = Some(end);
                tracing::debug!(task = %task.id, %start, %end, "scheduled");

                scheduled += 1;
                progress_made = true;
            }

            if !progress_made {
                break;
            }
        }

        let unscheduled: Vec<String> = project
            .tasks
            .iter()
            .filter(|t| !t.is_scheduled())
            .map(|t| t.id.clone())
            .collect();

        if !unscheduled.is_empty() {
            let cycles = DependencyGraph::build(&project.tasks).cycles();
            tracing::warn!(
                ?unscheduled,
                ?cycles,
                passes,
                "dependencies could not be resolved; tasks left without dates"
            );
        }

        PassReport {
            passes,
            scheduled,
            unscheduled,
        }
    }

    /// Latest end among resolved predecessors, floored at the project start.
    /// `None` while any existing predecessor is still unscheduled.
    fn resolve_anchor(
        tasks: &[Task],
        idx: usize,
        task_to_idx: &HashMap<String, usize>,
        project_start: NaiveDate,
    ) -> Option<NaiveDate> {
        let mut anchor = project_start;
        for pred_id in &tasks[idx].predecessors {
            let Some(&pred_idx) = task_to_idx.get(pred_id) else {
                continue;
            };
            let pred = &tasks[pred_idx];
            let pred_end = match (pred.computed_start, pred.computed_end) {
                (Some(_), Some(end)) => end,
                _ => return None,
            };
            if pred_end > anchor {
                anchor = pred_end;
            }
        }
        Some(anchor)
    }

    /// `None` when the start or end date falls outside the calendar range.
    fn place(&self, anchor: NaiveDate, task: &Task) -> Option<(NaiveDate, NaiveDate)> {
        let shifted = Duration::try_days(task.manual_start_offset)
            .and_then(|offset| anchor.checked_add_signed(offset));
        let candidate = match shifted {
            Some(date) => date,
            None => {
                tracing::warn!(
                    task = %task.id,
                    offset = task.manual_start_offset,
                    "manual offset leaves the calendar range; ignoring it"
                );
                anchor
            }
        };
        let start = self.calendar.checked_roll_forward(candidate)?;

        if task.duration_weeks == 0.0 {
            return Some((start, start));
        }
        let days = work_days(task.duration_weeks, self.config.workdays_per_week);
        let end = self.calendar.checked_find_next_available(start, days)?;
        Some((start, end))
    }
}

/// Whole working days in `weeks`, truncated.
pub(crate) fn work_days(weeks: f64, workdays_per_week: u32) -> i64 {
    if !weeks.is_finite() || weeks <= 0.0 {
        return 0;
    }
    (weeks * f64::from(workdays_per_week) + WORKDAY_EPSILON).floor() as i64
}
