pub mod absence;
pub mod calculations;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod project;
pub mod summary;
pub mod task;
pub mod task_validation;
pub mod templates;
pub mod workstream;

pub use absence::{Absence, AbsenceConflict, AbsenceError, find_absence_conflicts};
pub use calculations::{Block, BlockPartition, CompressionReport, PassReport};
pub use calendar::{Jurisdiction, WorkCalendar, is_non_working};
pub use config::{ConfigError, EngineConfig};
pub use engine::{TimelineEngine, compress_project, inject_workstream, schedule_project};
pub use graph::DependencyGraph;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteProjectStore;
pub use persistence::{
    JsonProjectStore, PersistenceError, ProjectStore, export_timeline_csv, load_project_from_csv,
    load_project_from_json, save_project_to_csv, save_project_to_json,
};
pub use project::{Project, ProjectError, ProjectSettings};
pub use summary::ScheduleSummary;
pub use task::{Task, TaskType};
pub use task_validation::TaskValidationError;
pub use templates::ProjectTemplate;
