//! Story Commands - 故事生成命令

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::story::{Draft, StoryPlan};

/// 生成故事计划命令
#[derive(Debug, Clone)]
pub struct ComposePlanCommand {
    pub premise: String,
}

/// 故事计划响应
#[derive(Debug, Clone)]
pub struct ComposePlanResponse {
    pub story_id: Uuid,
    pub plan: StoryPlan,
    pub generated_at: DateTime<Utc>,
}

/// 按已有大纲起草命令
///
/// 调用方直接提供上下文摘要与大纲（例如修改过计划之后）。
#[derive(Debug, Clone)]
pub struct ComposeDraftCommand {
    pub context_digest: String,
    pub outline: Vec<String>,
}

/// 起草响应
#[derive(Debug, Clone)]
pub struct ComposeDraftResponse {
    pub story_id: Uuid,
    pub draft: Draft,
    pub generated_at: DateTime<Utc>,
}

/// 从前提生成完整故事命令
#[derive(Debug, Clone)]
pub struct GenerateStoryCommand {
    pub premise: String,
}

/// 完整故事响应
#[derive(Debug, Clone)]
pub struct GenerateStoryResponse {
    pub story_id: Uuid,
    pub plan: StoryPlan,
    pub draft: Draft,
    pub generated_at: DateTime<Utc>,
}

impl GenerateStoryResponse {
    /// 最终故事文本（各段定稿直接拼接）
    pub fn full_text(&self) -> String {
        self.draft.full_text()
    }
}
