// HTTP routes configuration

use super::handlers::{health_handler, llm_tasks_handler};
use super::middleware::request_id_layers;
use crate::config::AppConfig;
use crate::tasks::TaskGateway;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub gateway: Arc<TaskGateway>,
}

pub fn create_router(config: AppConfig, gateway: Arc<TaskGateway>) -> Router {
    let state = AppState { config, gateway };

    let (set_request_id, propagate_request_id) = request_id_layers();

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/llm_tasks", post(llm_tasks_handler))
        .layer(tower_http::limit::RequestBodyLimitLayer::new(1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state)
}
