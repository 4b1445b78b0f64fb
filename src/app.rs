use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::board::SharedStore;
use crate::config::Settings;
use crate::{routes_board, routes_tasks};

// Shared application state
pub struct AppState {
    pub store: SharedStore,
    pub settings: Settings,
}

impl AppState {
    pub fn new(store: SharedStore, settings: Settings) -> Arc<Self> {
        Arc::new(Self { store, settings })
    }
}

// Router for everything under /api
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // tasks
        .route(
            "/tasks",
            get(routes_tasks::get_tasks)
                .post(routes_tasks::create_task)
                .delete(routes_tasks::reset_board),
        )
        .route("/tasks/:id", delete(routes_tasks::delete_task))
        .route("/tasks/:id/move", post(routes_tasks::move_task))
        .route("/tasks/:id/due", put(routes_tasks::set_due))
        .route("/dispatch", post(routes_tasks::dispatch))
        // board
        .route("/board", get(routes_board::get_board))
        .route("/columns/:status", get(routes_board::get_column))
        .route("/users", get(routes_board::get_users))
        .route("/diagnostics", get(routes_board::get_diagnostics))
}

// Full application: API, static frontend, request tracing
pub fn create_app(state: Arc<AppState>) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    let static_dir = state.settings.static_dir.clone();

    Router::new()
        .nest("/api", api_router().with_state(state))
        .fallback_service(ServeDir::new(static_dir))
        .layer(trace_layer)
}
