//! Seed projects for the three common deal shapes.

use crate::project::Project;
use crate::task::{Task, TaskType};
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectTemplate {
    StandardSellSide,
    FastTrack,
    BuySide,
}

impl ProjectTemplate {
    pub fn variants() -> [ProjectTemplate; 3] {
        [
            ProjectTemplate::StandardSellSide,
            ProjectTemplate::FastTrack,
            ProjectTemplate::BuySide,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            ProjectTemplate::StandardSellSide => "Standard Sell-Side M&A",
            ProjectTemplate::FastTrack => "Fast-Track / Sprint M&A",
            ProjectTemplate::BuySide => "Due Diligence Heavy / Buy-Side",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ProjectTemplate::StandardSellSide => "standard_sell_side",
            ProjectTemplate::FastTrack => "fast_track",
            ProjectTemplate::BuySide => "buy_side",
        }
    }

    /// Look a template up by display name fragment or key. Anything
    /// unrecognised maps to the standard sell-side process.
    pub fn lookup(name: &str) -> Self {
        name.parse().unwrap_or(ProjectTemplate::StandardSellSide)
    }

    /// Fresh, unscheduled project with the template's task list.
    pub fn build(self, start_date: NaiveDate) -> Project {
        let mut project = Project::new(self.name(), start_date);
        let tasks = match self {
            ProjectTemplate::StandardSellSide => standard_sell_side(),
            ProjectTemplate::FastTrack => fast_track(),
            ProjectTemplate::BuySide => buy_side(),
        };
        for task in tasks {
            project.add_task(task);
        }
        project
    }
}

impl fmt::Display for ProjectTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProjectTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.contains("Standard") {
            return Ok(ProjectTemplate::StandardSellSide);
        }
        if trimmed.contains("Fast-Track") {
            return Ok(ProjectTemplate::FastTrack);
        }
        if trimmed.contains("Buy-Side") {
            return Ok(ProjectTemplate::BuySide);
        }
        let key = trimmed.to_ascii_lowercase().replace(['-', ' '], "_");
        Self::variants()
            .into_iter()
            .find(|template| template.key() == key)
            .ok_or_else(|| format!("unknown template '{s}'"))
    }
}

fn task(id: &str, name: &str, phase: &str, weeks: f64, preds: &[&str]) -> Task {
    Task::new(id, name, phase, weeks).with_predecessors(preds.iter().copied())
}

fn standard_sell_side() -> Vec<Task> {
    const PREP: &str = "Phase 1: Preparation";
    const MARKETING: &str = "Phase 2: Marketing";
    const DD: &str = "Phase 3: Due Diligence & Exclusivity";
    const CONCLUSION: &str = "Phase 4: Conclusion";

    vec![
        task("T1.1", "Kick-off & Information Gathering", PREP, 2.0, &[]),
        task(
            "T1.2",
            "Preparation of Teaser & Information Memorandum (IM)",
            PREP,
            4.0,
            &["T1.1"],
        ),
        task(
            "T1.3",
            "Structuring of Virtual Data Room (VDR)",
            PREP,
            3.0,
            &["T1.1"],
        ),
        task(
            "T2.1",
            "Contact with Potential Investors & NDAs",
            MARKETING,
            3.0,
            &["T1.2"],
        ),
        task(
            "T2.2",
            "Distribution of IM & Process Letter I",
            MARKETING,
            1.0,
            &["T2.1"],
        )
        .with_type(TaskType::Milestone),
        task(
            "T2.3",
            "Reception & Evaluation of Non-Binding Offers (NBOs)",
            MARKETING,
            2.0,
            &["T2.2"],
        )
        .with_type(TaskType::KeyDecision),
        task(
            "T3.1",
            "VDR Access & Confirmatory Due Diligence",
            DD,
            6.0,
            &["T2.3"],
        ),
        task(
            "T3.2",
            "Management Presentations & Site Visits",
            DD,
            2.0,
            &["T2.3"],
        )
        .with_type(TaskType::Bottleneck),
        task(
            "T3.3",
            "Sharing of SPA Drafts & Legal Terms",
            DD,
            1.0,
            &["T3.1"],
        ),
        task(
            "T3.4",
            "Reception of Binding Offers (BOs) & SPA Mark-up",
            DD,
            2.0,
            &["T3.1"],
        )
        .with_type(TaskType::KeyDecision),
        task(
            "T4.1",
            "Final Negotiation with Selected Investor",
            CONCLUSION,
            3.0,
            &["T3.4"],
        ),
        task(
            "T4.2",
            "Finalization of Legal Docs & SPA Signature / Closing",
            CONCLUSION,
            1.0,
            &["T4.1"],
        )
        .with_type(TaskType::Milestone),
    ]
}

fn fast_track() -> Vec<Task> {
    const PREP: &str = "Phase 1: Accelerated Prep & Marketing";
    const CLOSING: &str = "Phase 2: Deep Dive & Closing";

    vec![
        task("F1.1", "Teaser, VDR Setup & Initial Contacts", PREP, 3.0, &[]),
        task(
            "F1.2",
            "IM Distribution & Fast-track NDAs",
            PREP,
            2.0,
            &["F1.1"],
        ),
        task("F1.3", "Reception of NBOs", PREP, 1.0, &["F1.2"]).with_type(TaskType::KeyDecision),
        task("F2.1", "Intensive DD & Q&A", CLOSING, 4.0, &["F1.3"]),
        task("F2.2", "Management Presentations", CLOSING, 1.0, &["F1.3"])
            .with_type(TaskType::Bottleneck),
        task(
            "F2.3",
            "Binding Offers & SPA Negotiation",
            CLOSING,
            2.0,
            &["F2.1"],
        )
        .with_type(TaskType::KeyDecision),
        task("F2.4", "Closing", CLOSING, 1.0, &["F2.3"]).with_type(TaskType::Milestone),
    ]
}

fn buy_side() -> Vec<Task> {
    const KICKOFF: &str = "Phase 1: DD Kick-off";
    const EXECUTION: &str = "Phase 2: Execution & Q&A";
    const LEGAL: &str = "Phase 3: Legal & Conclusion";

    vec![
        task(
            "D1.1",
            "Kick-off Meetings for DDs (Financial, Tax, Legal)",
            KICKOFF,
            1.0,
            &[],
        ),
        task(
            "D1.2",
            "Data Room Opening & Info Processing",
            KICKOFF,
            2.0,
            &["D1.1"],
        ),
        task(
            "D2.1",
            "Expert Sessions & Q&A with Key People",
            EXECUTION,
            3.0,
            &["D1.2"],
        ),
        task(
            "D2.2",
            "Confirmatory DD Execution",
            EXECUTION,
            5.0,
            &["D1.2"],
        ),
        task("D3.1", "SPA Draft Sharing", LEGAL, 1.0, &["D2.2"]),
        task(
            "D3.2",
            "Evaluation of BOs & SPA Mark-up",
            LEGAL,
            2.0,
            &["D3.1"],
        )
        .with_type(TaskType::KeyDecision),
        task(
            "D3.3",
            "Final Negotiation & Closing",
            LEGAL,
            2.0,
            &["D3.2"],
        )
        .with_type(TaskType::Milestone),
    ]
}
