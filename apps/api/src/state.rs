use std::sync::Arc;

use crate::config::Config;
use crate::normalize::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Compiled once at startup; holds no per-upload state.
    pub pipeline: Arc<Pipeline>,
}
