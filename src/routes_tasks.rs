// --------------------------------------------------
// Handles API endpoints that change the board.
//
// Responsibilities:
// - List / create / delete tasks, reset the whole board
// - Move a task between columns, set its due date
// - Generic dispatch of any board action
//
// Input is validated here, before anything reaches the store.
// --------------------------------------------------

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::Action;
use crate::app::AppState;
use crate::board::Dispatched;
use crate::error::{ApiError, ApiResult};
use crate::models::{Status, Task};

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("invalid id".to_string()))
}

// Caller-side checks the reducer relies on
fn validate(action: &Action, state: &AppState) -> ApiResult<()> {
    if let Some(title) = action.title() {
        if title.trim().is_empty() {
            return Err(ApiError::BadRequest("title required".to_string()));
        }
    }
    if let Action::ToggleAssignee { user_id, .. } = action {
        if !state.settings.has_user(user_id) {
            return Err(ApiError::BadRequest(format!("unknown user {user_id}")));
        }
    }
    Ok(())
}

// Dispatch and turn a skip into an HTTP error; returns the task afterwards
async fn apply(state: &AppState, id: Uuid, action: Action) -> ApiResult<Task> {
    let mut store = state.store.lock().await;
    if let Dispatched::Skipped(skip) = store.dispatch(action) {
        return Err(skip.into());
    }
    store
        .get(id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("task not found".to_string()))
}

// -----------------------------
// GET /api/tasks
// Every task, in storage order
// -----------------------------
pub async fn get_tasks(State(state): State<Arc<AppState>>) -> Json<Vec<Task>> {
    let store = state.store.lock().await;
    Json(store.tasks().to_vec())
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
}

// -----------------------------
// POST /api/tasks
// Adds a task on top of the New column
// -----------------------------
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(input): Json<CreateTaskInput>,
) -> ApiResult<impl IntoResponse> {
    let action = Action::AddTask {
        title: input.title.trim().to_string(),
        description: input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    };
    validate(&action, &state)?;

    let mut store = state.store.lock().await;
    store.dispatch(action);
    let created = store
        .tasks()
        .first()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("task missing right after creation"))?;

    tracing::info!(task_id = %created.id, "task created");
    Ok((StatusCode::CREATED, Json(created)))
}

// -----------------------------
// DELETE /api/tasks/:id
// -----------------------------
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;

    let mut store = state.store.lock().await;
    if let Dispatched::Skipped(skip) = store.dispatch(Action::DeleteTask(id)) {
        return Err(skip.into());
    }

    tracing::info!(task_id = %id, "task deleted");
    Ok(Json(serde_json::json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskInput {
    pub to_status: Status,
}

// -----------------------------
// POST /api/tasks/:id/move
// Appends the task to the end of another column
// -----------------------------
pub async fn move_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<MoveTaskInput>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(&id)?;
    let moved = apply(&state, id, Action::MoveTask { id, to_status: input.to_status }).await?;
    Ok(Json(moved))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDueInput {
    pub due_at: Option<String>, // RFC3339, null clears
}

// -----------------------------
// PUT /api/tasks/:id/due
// -----------------------------
pub async fn set_due(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(input): Json<SetDueInput>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(&id)?;

    let due_at = match input.due_at.as_deref() {
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(raw)
                .map_err(|_| ApiError::BadRequest("invalid due_at".to_string()))?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    let updated = apply(&state, id, Action::SetDue { id, due_at }).await?;
    Ok(Json(updated))
}

#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

// -----------------------------
// POST /api/dispatch
// Any board action; a no-op is reported, not treated as an error
// -----------------------------
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    Json(action): Json<Action>,
) -> ApiResult<Json<DispatchResponse>> {
    validate(&action, &state)?;

    let mut store = state.store.lock().await;
    let outcome = store.dispatch(action);
    let skipped = match &outcome {
        Dispatched::Skipped(skip) => Some(skip.to_string()),
        Dispatched::Applied => None,
    };
    Ok(Json(DispatchResponse {
        applied: outcome.is_applied(),
        skipped,
    }))
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub removed: usize,
}

// -----------------------------
// DELETE /api/tasks
// Empties the board and removes the saved copy
// -----------------------------
pub async fn reset_board(State(state): State<Arc<AppState>>) -> Json<ResetResponse> {
    let removed = state.store.lock().await.reset();
    tracing::warn!(removed, "board reset over the API");
    Json(ResetResponse { removed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::create_app;
    use crate::board::{SharedStore, TaskStore};
    use crate::config::Settings;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_app() -> (Router, SharedStore) {
        let store = TaskStore::new().into_shared();
        let settings = Settings::from_lookup(|_| None).unwrap();
        (create_app(AppState::new(store.clone(), settings)), store)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn create_rejects_blank_titles() {
        let (app, store) = test_app();
        let (status, body) = call(&app, Method::POST, "/api/tasks", Some(json!({ "title": "   " }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(store.lock().await.tasks().is_empty());
    }

    #[tokio::test]
    async fn create_move_and_delete() {
        let (app, _) = test_app();

        let (status, created) =
            call(&app, Method::POST, "/api/tasks", Some(json!({ "title": " Ship it ", "description": "" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["title"], "Ship it");
        assert!(created.get("description").is_none());
        let id = created["id"].as_str().unwrap().to_string();

        let (status, moved) =
            call(&app, Method::POST, &format!("/api/tasks/{id}/move"), Some(json!({ "toStatus": "ongoing" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["status"], "ongoing");
        assert!(moved["movedToOngoingAt"].is_string());

        // same column again is a conflict for the REST endpoint
        let (status, _) =
            call(&app, Method::POST, &format!("/api/tasks/{id}/move"), Some(json!({ "toStatus": "ongoing" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(&app, Method::DELETE, &format!("/api/tasks/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, Method::DELETE, &format!("/api/tasks/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, tasks) = call(&app, Method::GET, "/api/tasks", None).await;
        assert_eq!(tasks, json!([]));
    }

    #[tokio::test]
    async fn set_due_validates_dates() {
        let (app, _) = test_app();
        let (_, created) = call(&app, Method::POST, "/api/tasks", Some(json!({ "title": "A" }))).await;
        let id = created["id"].as_str().unwrap().to_string();
        let uri = format!("/api/tasks/{id}/due");

        let (status, _) = call(&app, Method::PUT, &uri, Some(json!({ "dueAt": "tomorrow" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, task) =
            call(&app, Method::PUT, &uri, Some(json!({ "dueAt": "2099-01-01T09:00:00+02:00" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(task["dueAt"], "2099-01-01T07:00:00Z");

        let (status, task) = call(&app, Method::PUT, &uri, Some(json!({ "dueAt": null }))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(task.get("dueAt").is_none());

        let (status, _) = call(&app, Method::PUT, "/api/tasks/not-a-uuid/due", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn dispatch_reports_skips_without_failing() {
        let (app, store) = test_app();

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/dispatch",
            Some(json!({ "type": "ADD_TASK", "payload": { "title": "A" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "applied": true }));

        let ghost = Uuid::new_v4();
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/dispatch",
            Some(json!({ "type": "DELETE_TASK", "payload": ghost })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], false);
        assert_eq!(body["skipped"], format!("task {ghost} not found"));

        assert_eq!(store.lock().await.skipped(), 1);
    }

    #[tokio::test]
    async fn reset_empties_the_board() {
        let (app, store) = test_app();
        for title in ["A", "B"] {
            call(&app, Method::POST, "/api/tasks", Some(json!({ "title": title }))).await;
        }

        let (status, body) = call(&app, Method::DELETE, "/api/tasks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "removed": 2 }));
        assert!(store.lock().await.tasks().is_empty());

        let (_, body) = call(&app, Method::DELETE, "/api/tasks", None).await;
        assert_eq!(body["removed"], 0);
    }

    #[tokio::test]
    async fn dispatch_checks_assignee_roster() {
        let (app, store) = test_app();
        store
            .lock()
            .await
            .dispatch(Action::AddTask { title: "A".into(), description: None });
        let id = store.lock().await.tasks()[0].id;

        let toggle = |user: &str| json!({ "type": "TOGGLE_ASSIGNEE", "payload": { "id": id, "userId": user } });

        let (status, _) = call(&app, Method::POST, "/api/dispatch", Some(toggle("42"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(&app, Method::POST, "/api/dispatch", Some(toggle("2"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], true);
        assert_eq!(store.lock().await.tasks()[0].assigned_user_ids, vec!["2"]);
    }
}
