pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::normalize::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Resume normalization
        .route(
            "/api/v1/resumes/normalize",
            post(handlers::handle_normalize),
        )
        .route("/api/v1/resumes/validate", post(handlers::handle_validate))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
