//! Story HTTP Handlers
//!
//! 请求在处理期间持有一个派生自服务关闭信号的取消令牌；
//! 客户端断开时 axum 丢弃处理中的 future，进行中的后端调用随之被丢弃。

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{ComposeDraftCommand, ComposePlanCommand, GenerateStoryCommand};
use crate::infrastructure::http::dto::{
    ApiResponse, ComposeDraftRequest, ComposePlanRequest, DraftResponse, GenerateStoryRequest,
    PlanResponse, StoryResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 生成故事计划
pub async fn compose_plan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ComposePlanRequest>,
) -> Result<Json<ApiResponse<PlanResponse>>, ApiError> {
    let cancel = state.request_token();
    let command = ComposePlanCommand {
        premise: req.premise,
    };

    let result = state.compose_plan_handler.handle(command, &cancel).await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 按给定大纲起草
pub async fn compose_draft(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ComposeDraftRequest>,
) -> Result<Json<ApiResponse<DraftResponse>>, ApiError> {
    let cancel = state.request_token();
    let command = ComposeDraftCommand {
        context_digest: req.context_digest,
        outline: req.outline,
    };

    let result = state.compose_draft_handler.handle(command, &cancel).await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 从前提生成完整故事
pub async fn generate_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateStoryRequest>,
) -> Result<Json<ApiResponse<StoryResponse>>, ApiError> {
    let cancel = state.request_token();
    let command = GenerateStoryCommand {
        premise: req.premise,
    };

    let result = state.generate_story_handler.handle(command, &cancel).await?;

    tracing::info!(
        story_id = %result.story_id,
        sections = result.draft.len(),
        "Story response ready"
    );

    Ok(Json(ApiResponse::success(result.into())))
}
