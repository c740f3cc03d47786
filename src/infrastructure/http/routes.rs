//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping              GET   健康检查（含后端状态）
//! - /api/story/plan        POST  前提 → 故事计划
//! - /api/story/draft       POST  上下文摘要 + 大纲 → 草稿
//! - /api/story/generate    POST  前提 → 完整故事

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/story", story_routes())
}

/// Story 路由
fn story_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/plan", post(handlers::compose_plan))
        .route("/draft", post(handlers::compose_draft))
        .route("/generate", post(handlers::generate_story))
}
