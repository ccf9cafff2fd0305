pub mod api;
pub mod config;
pub mod error;
pub mod state;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router over shared state.
pub fn create_router(state: Arc<AppState>) -> Router {
    api::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
