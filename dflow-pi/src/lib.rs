//! dflow-pi library interface
//!
//! Exposes the intake workflow and router for integration testing.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use axum::Router;
use config::IntakeConfig;
use workflow::IntakeWorkflow;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The intake workflow with its per-id claim registry
    pub workflow: Arc<IntakeWorkflow>,
    /// Immutable service configuration
    pub config: Arc<IntakeConfig>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Arc<IntakeConfig>) -> Self {
        Self {
            workflow: Arc::new(IntakeWorkflow::new(Arc::clone(&config))),
            config,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::import_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
