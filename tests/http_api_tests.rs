#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use timeline_engine::{Project, Task, http_api};
use tower::util::ServiceExt;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn two_task_project() -> Project {
    let mut project = Project::new("HTTP", d(2024, 3, 4));
    project.add_task(Task::new("A", "Prep", "Phase 1: Preparation", 1.0));
    project.add_task(Task::new("B", "Marketing", "Phase 2: Marketing", 1.0).with_predecessors(["A"]));
    project
}

fn new_router() -> axum::Router {
    http_api::router(http_api::AppState::new(two_task_project()))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let response = new_router()
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn state_is_scheduled_on_construction() {
    let response = new_router()
        .oneshot(empty_request("GET", "/tasks/B"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let task = read_json(response).await;
    assert_eq!(task["computed_start"], "2024-03-11");
    assert_eq!(task["computed_end"], "2024-03-18");
    assert_eq!(task["serial_number"], 2);
}

#[tokio::test]
async fn task_lifecycle_via_http_api() {
    let app = new_router();
    let task = Task::new("C", "Signing", "Phase 2: Marketing", 1.0).with_predecessors(["B"]);

    // Create
    let response = app
        .clone()
        .oneshot(json_request("POST", "/tasks", serde_json::to_value(&task).unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    assert_eq!(created["computed_start"], "2024-03-18");

    // Update duration
    let mut edited = task.clone();
    edited.set_duration_weeks(2.0);
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/tasks/C", serde_json::to_value(&edited).unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated["computed_end"], "2024-04-01");

    // Delete
    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/tasks/C"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone
    let response = app
        .oneshot(empty_request("GET", "/tasks/C"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = read_json(response).await;
    assert_eq!(error["error"], "not_found");
    assert!(error["message"].as_str().unwrap().contains("C"));
}

#[tokio::test]
async fn duplicate_and_invalid_tasks_are_rejected() {
    let app = new_router();
    let duplicate = Task::new("A", "Again", "Phase 1", 1.0);
    let response = app
        .clone()
        .oneshot(json_request("POST", "/tasks", serde_json::to_value(&duplicate).unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["error"], "conflict");

    let negative = json!({ "id": "N", "name": "Bad", "phase": "Phase 1", "duration_weeks": -1.0 });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/tasks", negative))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "invalid_request");

    let mismatched = Task::new("Z", "Other", "Phase 1", 1.0);
    let response = app
        .oneshot(json_request("PUT", "/tasks/A", serde_json::to_value(&mismatched).unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn compress_returns_block_ratios_and_summary() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/compress",
            json!({ "marketing_date": "2024-03-06", "signing_date": "2024-03-20" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["report"]["block_one_ratio"], 0.4);
    assert_eq!(body["report"]["block_two_ratio"], 2.0);
    assert_eq!(body["summary"]["critically_compressed"], json!(["A"]));

    // No body resets to the baseline
    let response = app
        .clone()
        .oneshot(empty_request("POST", "/compress"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["report"]["block_one_ratio"], Value::Null);

    let response = app
        .oneshot(empty_request("GET", "/tasks/A"))
        .await
        .unwrap();
    let task = read_json(response).await;
    assert_eq!(task["duration_weeks"], 1.0);
    assert_eq!(task["compression_ratio"], 1.0);
}

#[tokio::test]
async fn workstream_injection_enables_vdd_once() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request("POST", "/template", json!({ "template": "Standard Sell-Side M&A" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/workstream"))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["injected"], true);
    assert_eq!(body["project"]["vdd_enabled"], true);
    assert_eq!(body["project"]["tasks"][1]["id"], "VDD.1");
    assert_eq!(body["project"]["tasks"][1]["computed_start"], "2024-03-18");

    let response = app
        .oneshot(empty_request("POST", "/workstream"))
        .await
        .unwrap();
    assert_eq!(read_json(response).await["injected"], false);
}

#[tokio::test]
async fn template_endpoint_replaces_tasks_and_keeps_holidays() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/project",
            json!({ "name": "HTTP", "start_date": "2024-03-04", "jurisdictions": ["US", "PT"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/template",
            json!({ "template": "fast_track", "start_date": "2024-06-03" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let project = read_json(response).await;
    assert_eq!(project["name"], "Fast-Track / Sprint M&A");
    assert_eq!(project["jurisdictions"], json!(["US", "PT"]));
    assert_eq!(project["tasks"].as_array().unwrap().len(), 7);
    assert_eq!(project["tasks"][0]["computed_start"], "2024-06-03");

    let response = app
        .oneshot(json_request("POST", "/template", json!({ "template": "nope" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn project_settings_without_jurisdictions_are_rejected() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/project",
            json!({ "name": "HTTP", "start_date": "2024-03-04", "jurisdictions": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // tasks survive a rejected update
    let response = app.oneshot(empty_request("GET", "/tasks")).await.unwrap();
    assert_eq!(read_json(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn conflicts_endpoint_flags_key_tasks() {
    let app = new_router();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/template",
            json!({ "template": "standard_sell_side", "start_date": "2024-03-04" }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/conflicts",
            json!({ "absences": [
                { "name": "Alice", "start": "2024-01-01", "end": "2024-12-31" }
            ] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let conflicts = read_json(response).await;
    let ids: Vec<&str> = conflicts
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["task_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["T2.3", "T3.2", "T3.4"]);

    let response = app
        .oneshot(json_request(
            "POST",
            "/conflicts",
            json!({ "absences": [
                { "name": "Bob", "start": "2024-05-01", "end": "2024-04-01" }
            ] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_compress_targets_are_rejected_without_touching_state() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/compress",
            json!({ "marketing_date": "2024-03-06" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for body in [
        json!({ "marketing_date": "2024-02-30" }),
        json!({ "signing_date": "15/03/2024" }),
        json!({ "marketingDate": "2024-03-06" }),
    ] {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/compress", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "invalid_request");
    }

    // the earlier compression is still in place
    let response = app
        .oneshot(empty_request("GET", "/tasks/A"))
        .await
        .unwrap();
    let task = read_json(response).await;
    assert_eq!(task["compression_ratio"], 0.4);
}

#[tokio::test]
async fn out_of_range_tasks_are_rejected() {
    let app = new_router();
    let huge = json!({ "id": "H", "name": "Forever", "phase": "Phase 2", "duration_weeks": 1e9 });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/tasks", huge))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let far = json!({
        "id": "F", "name": "Far", "phase": "Phase 2", "duration_weeks": 1.0,
        "manual_start_offset": 90_000_000i64
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/tasks", far))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(empty_request("GET", "/tasks")).await.unwrap();
    assert_eq!(read_json(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn duration_edit_with_echoed_baseline_survives_reset() {
    let app = new_router();
    let response = app
        .clone()
        .oneshot(empty_request("GET", "/tasks/B"))
        .await
        .unwrap();
    let mut task = read_json(response).await;
    task["duration_weeks"] = json!(2.0);

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/tasks/B", task))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await;
    assert_eq!(updated["original_duration_weeks"], 2.0);

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/compress"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request("GET", "/tasks/B"))
        .await
        .unwrap();
    let task = read_json(response).await;
    assert_eq!(task["duration_weeks"], 2.0);
    assert_eq!(task["computed_end"], "2024-03-25");
}
