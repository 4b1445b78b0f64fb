use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::models::{Status, Task, User};
use crate::ordering;
use crate::overdue;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistProgress {
    pub completed: usize,
    pub total: usize,
}

// A task as a board card: stored fields plus what the card displays
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardResponse {
    #[serde(flatten)]
    pub task: Task,
    pub is_overdue: bool,
    pub checklist_progress: ChecklistProgress,
}

impl CardResponse {
    fn from_task(task: Task, now: DateTime<Utc>) -> Self {
        let (completed, total) = task
            .checklists
            .iter()
            .map(|cl| cl.progress())
            .fold((0, 0), |(c, t), (dc, dt)| (c + dc, t + dt));

        CardResponse {
            is_overdue: overdue::is_overdue(&task, now),
            checklist_progress: ChecklistProgress { completed, total },
            task,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ColumnResponse {
    pub status: Status,
    pub tasks: Vec<CardResponse>,
}

#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub now: String,
    pub columns: Vec<ColumnResponse>,
}

fn column(tasks: Vec<Task>, status: Status, now: DateTime<Utc>) -> ColumnResponse {
    ColumnResponse {
        status,
        tasks: tasks
            .into_iter()
            .map(|t| CardResponse::from_task(t, now))
            .collect(),
    }
}

// GET /api/board -> all three columns in display order
pub async fn get_board(State(state): State<Arc<AppState>>) -> Json<BoardResponse> {
    let now = Utc::now();
    let store = state.store.lock().await;

    let columns = Status::ALL
        .into_iter()
        .map(|status| column(store.tasks_by_status(status), status, now))
        .collect();

    Json(BoardResponse {
        now: now.to_rfc3339(),
        columns,
    })
}

// GET /api/columns/:status
pub async fn get_column(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
) -> ApiResult<Json<ColumnResponse>> {
    let status: Status = status.parse().map_err(ApiError::BadRequest)?;
    let now = Utc::now();
    let store = state.store.lock().await;
    Ok(Json(column(store.tasks_by_status(status), status, now)))
}

// GET /api/users
pub async fn get_users(State(state): State<Arc<AppState>>) -> Json<Vec<User>> {
    Json(state.settings.users.clone())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticsResponse {
    pub total: usize,
    pub skipped: u64,
    pub ordering_dense: bool,
}

// GET /api/diagnostics
pub async fn get_diagnostics(State(state): State<Arc<AppState>>) -> Json<DiagnosticsResponse> {
    let store = state.store.lock().await;
    Json(DiagnosticsResponse {
        total: store.tasks().len(),
        skipped: store.skipped(),
        ordering_dense: ordering::is_dense(store.tasks()),
    })
}
