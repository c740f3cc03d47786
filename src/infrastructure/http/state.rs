//! Application State
//!
//! 包含所有 Command Handlers 与服务级取消信号

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::{
    ComposeDraftHandler, ComposePlanHandler, GenerateStoryHandler, PipelineConfig,
    TextGenerationPort,
};

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub backend: Arc<dyn TextGenerationPort>,

    // ========== Command Handlers ==========
    pub compose_plan_handler: ComposePlanHandler,
    pub compose_draft_handler: ComposeDraftHandler,
    pub generate_story_handler: GenerateStoryHandler,

    /// 服务关闭时取消，所有进行中的流水线都派生自它
    pub shutdown: CancellationToken,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        backend: Arc<dyn TextGenerationPort>,
        pipeline: &PipelineConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            backend: backend.clone(),
            compose_plan_handler: ComposePlanHandler::new(backend.clone(), pipeline),
            compose_draft_handler: ComposeDraftHandler::new(backend.clone(), pipeline),
            generate_story_handler: GenerateStoryHandler::new(backend, pipeline),
            shutdown,
        }
    }

    /// 单个请求使用的取消信号
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
