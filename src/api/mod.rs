pub mod handlers;

pub use handlers::*;

use crate::service::ModuleMatchingService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 构建路由
pub fn router(service: Arc<ModuleMatchingService>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/module-matching", post(module_matching))
        .route("/api/module-matching/statistics", post(statistics))
        .with_state(service)
}
