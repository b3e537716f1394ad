use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::absence::{Absence, AbsenceConflict, find_absence_conflicts};
use crate::calculations::CompressionReport;
use crate::engine::TimelineEngine;
use crate::project::{Project, ProjectError, ProjectSettings};
use crate::summary::ScheduleSummary;
use crate::task::Task;
use crate::task_validation::{self, TaskValidationError};
use crate::templates::ProjectTemplate;

/// Shared project plus the engine that recomputes it. The stored project is
/// rescheduled after every mutation.
#[derive(Clone)]
pub struct AppState {
    project: Arc<RwLock<Project>>,
    engine: Arc<TimelineEngine>,
}

impl AppState {
    pub fn new(project: Project) -> Self {
        Self::with_engine(project, TimelineEngine::default())
    }

    pub fn with_engine(project: Project, engine: TimelineEngine) -> Self {
        let project = engine.schedule(&project);
        Self {
            project: Arc::new(RwLock::new(project)),
            engine: Arc::new(engine),
        }
    }

    fn project(&self) -> Arc<RwLock<Project>> {
        self.project.clone()
    }

    fn reschedule(&self, project: &mut Project) {
        *project = self.engine.schedule(project);
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<ProjectError> for ApiError {
    fn from(value: ProjectError) -> Self {
        match value {
            ProjectError::TaskNotFound(_) => ApiError::NotFound(value.to_string()),
            ProjectError::DuplicateTask(_) => ApiError::Conflict(value.to_string()),
            ProjectError::PositionOutOfRange { .. } => ApiError::Invalid(value.to_string()),
        }
    }
}

impl From<TaskValidationError> for ApiError {
    fn from(value: TaskValidationError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                tracing::error!(%message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CompressPayload {
    #[serde(default)]
    marketing_date: Option<NaiveDate>,
    #[serde(default)]
    signing_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct CompressResponse {
    report: CompressionReport,
    summary: ScheduleSummary,
}

#[derive(Debug, Deserialize)]
struct TemplatePayload {
    template: String,
    #[serde(default)]
    start_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct ConflictsPayload {
    absences: Vec<Absence>,
}

#[derive(Debug, Serialize)]
struct WorkstreamResponse {
    injected: bool,
    project: Project,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/project", get(get_project).put(update_project))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/schedule", post(schedule_project))
        .route("/compress", post(compress_project))
        .route("/workstream", post(inject_workstream))
        .route("/summary", get(get_summary))
        .route("/template", post(apply_template))
        .route("/conflicts", post(find_conflicts))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_project(State(state): State<AppState>) -> Json<Project> {
    let project = state.project();
    let snapshot = project.read().clone();
    Json(snapshot)
}

async fn update_project(
    State(state): State<AppState>,
    Json(settings): Json<ProjectSettings>,
) -> Result<Json<Project>, ApiError> {
    let project = state.project();
    let updated = {
        let mut guard = project.write();
        let tasks = std::mem::take(&mut guard.tasks);
        let candidate = Project::from_settings(settings, tasks);
        if let Err(err) = task_validation::validate_project(&candidate) {
            guard.tasks = candidate.tasks;
            return Err(err.into());
        }
        *guard = candidate;
        state.reschedule(&mut guard);
        guard.clone()
    };
    Ok(Json(updated))
}

async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    let project = state.project();
    let tasks = project.read().tasks.clone();
    Json(tasks)
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let project = state.project();
    let task = project.read().get_task(&task_id).cloned();
    task.map(Json)
        .ok_or_else(|| ApiError::not_found(format!("task {task_id} not found")))
}

async fn create_task(
    State(state): State<AppState>,
    Json(task): Json<Task>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    task_validation::validate_task(&task)?;
    let task_id = task.id.clone();
    let project = state.project();
    let created = {
        let mut guard = project.write();
        guard.create_task(task)?;
        state.reschedule(&mut guard);
        guard
            .get_task(&task_id)
            .cloned()
            .ok_or_else(|| ApiError::internal("task not found after creation"))?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(task): Json<Task>,
) -> Result<Json<Task>, ApiError> {
    if task.id != task_id {
        return Err(ApiError::invalid(
            "task id in payload does not match path parameter",
        ));
    }
    task_validation::validate_task(&task)?;
    let project = state.project();
    let updated = {
        let mut guard = project.write();
        guard.update_task(task)?;
        state.reschedule(&mut guard);
        guard
            .get_task(&task_id)
            .cloned()
            .ok_or_else(|| ApiError::internal("task not found after update"))?
    };
    Ok(Json(updated))
}

async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let project = state.project();
    {
        let mut guard = project.write();
        guard.delete_task(&task_id)?;
        state.reschedule(&mut guard);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn schedule_project(State(state): State<AppState>) -> Json<ScheduleSummary> {
    let project = state.project();
    let summary = {
        let mut guard = project.write();
        state.reschedule(&mut guard);
        state.engine.summarize(&guard)
    };
    Json(summary)
}

async fn compress_project(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CompressResponse>, ApiError> {
    // An empty body means "no targets" and resets to the baseline.
    let payload: CompressPayload = if body.iter().all(u8::is_ascii_whitespace) {
        CompressPayload::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::invalid(format!("invalid compress payload: {err}")))?
    };
    let project = state.project();
    let response = {
        let mut guard = project.write();
        let (compressed, report) =
            state
                .engine
                .compress_with_report(&guard, payload.marketing_date, payload.signing_date);
        *guard = compressed;
        CompressResponse {
            report,
            summary: state.engine.summarize(&guard),
        }
    };
    Ok(Json(response))
}

async fn inject_workstream(State(state): State<AppState>) -> Json<WorkstreamResponse> {
    let project = state.project();
    let response = {
        let mut guard = project.write();
        guard.vdd_enabled = true;
        let before = guard.tasks.len();
        *guard = state.engine.inject_workstream(&guard);
        let injected = guard.tasks.len() != before;
        state.reschedule(&mut guard);
        WorkstreamResponse {
            injected,
            project: guard.clone(),
        }
    };
    Json(response)
}

async fn get_summary(State(state): State<AppState>) -> Json<ScheduleSummary> {
    let project = state.project();
    let summary = state.engine.summarize(&project.read());
    Json(summary)
}

async fn apply_template(
    State(state): State<AppState>,
    Json(payload): Json<TemplatePayload>,
) -> Result<Json<Project>, ApiError> {
    let template: ProjectTemplate = payload
        .template
        .parse()
        .map_err(|err: String| ApiError::invalid(err))?;
    let project = state.project();
    let updated = {
        let mut guard = project.write();
        let start_date = payload.start_date.unwrap_or(guard.start_date);
        let mut fresh = template.build(start_date);
        fresh.jurisdictions = guard.jurisdictions.clone();
        fresh.custom_holidays = guard.custom_holidays.clone();
        *guard = state.engine.schedule(&fresh);
        guard.clone()
    };
    Ok(Json(updated))
}

async fn find_conflicts(
    State(state): State<AppState>,
    Json(payload): Json<ConflictsPayload>,
) -> Result<Json<Vec<AbsenceConflict>>, ApiError> {
    for absence in &payload.absences {
        absence
            .validate()
            .map_err(|err| ApiError::invalid(err.to_string()))?;
    }
    let project = state.project();
    let conflicts = find_absence_conflicts(&project.read(), &payload.absences);
    Ok(Json(conflicts))
}
