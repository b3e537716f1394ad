use crate::project::Project;
use crate::task_validation::{self, TaskValidationError};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid project: {0}")]
    Validation(#[from] TaskValidationError),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("no project stored")]
    NotFound,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait ProjectStore {
    fn save_project(&self, project: &Project) -> PersistenceResult<()>;
    fn load_project(&self) -> PersistenceResult<Option<Project>>;
}

pub fn validate_project(project: &Project) -> PersistenceResult<()> {
    task_validation::validate_project(project)?;
    Ok(())
}

/// Single JSON snapshot on disk.
pub struct JsonProjectStore {
    path: PathBuf,
}

impl JsonProjectStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProjectStore for JsonProjectStore {
    fn save_project(&self, project: &Project) -> PersistenceResult<()> {
        save_project_to_json(project, &self.path)
    }

    fn load_project(&self) -> PersistenceResult<Option<Project>> {
        if !self.path.exists() {
            return Ok(None);
        }
        load_project_from_json(&self.path).map(Some)
    }
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    export_timeline_csv, load_project_from_csv, load_project_from_json, save_project_to_csv,
    save_project_to_json,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteProjectStore;
