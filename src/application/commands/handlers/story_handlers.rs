//! Story Command Handlers
//!
//! GenerateStoryHandler 即流水线编排：计划的输出直接作为起草的输入，
//! 草稿拼接后的全文是最终结果。

use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::application::commands::{
    ComposeDraftCommand, ComposeDraftResponse, ComposePlanCommand, ComposePlanResponse,
    GenerateStoryCommand, GenerateStoryResponse,
};
use crate::application::error::StoryError;
use crate::application::ports::TextGenerationPort;
use crate::application::services::{
    BackendCaller, PipelineConfig, PlanComposer, SectionDraftGenerator,
};
use crate::domain::story::{ContextDigest, Premise};

// ============================================================================
// ComposePlan
// ============================================================================

/// ComposePlan Handler - 前提 → 故事计划
pub struct ComposePlanHandler {
    composer: PlanComposer,
}

impl ComposePlanHandler {
    pub fn new(backend: Arc<dyn TextGenerationPort>, config: &PipelineConfig) -> Self {
        let caller = BackendCaller::new(backend, config.call_timeout);
        Self {
            composer: PlanComposer::new(caller, config),
        }
    }

    pub async fn handle(
        &self,
        command: ComposePlanCommand,
        cancel: &CancellationToken,
    ) -> Result<ComposePlanResponse, StoryError> {
        let story_id = Uuid::new_v4();
        let premise = Premise::new(command.premise)?;

        let plan = self.composer.compose_plan(&premise, cancel).await?;

        tracing::info!(
            story_id = %story_id,
            characters = plan.characters().len(),
            sections = plan.section_count(),
            "Story plan composed"
        );

        Ok(ComposePlanResponse {
            story_id,
            plan,
            generated_at: Utc::now(),
        })
    }
}

// ============================================================================
// ComposeDraft
// ============================================================================

/// ComposeDraft Handler - 摘要 + 大纲 → 草稿
pub struct ComposeDraftHandler {
    generator: SectionDraftGenerator,
}

impl ComposeDraftHandler {
    pub fn new(backend: Arc<dyn TextGenerationPort>, config: &PipelineConfig) -> Self {
        let caller = BackendCaller::new(backend, config.call_timeout);
        Self {
            generator: SectionDraftGenerator::new(caller, config),
        }
    }

    pub async fn handle(
        &self,
        command: ComposeDraftCommand,
        cancel: &CancellationToken,
    ) -> Result<ComposeDraftResponse, StoryError> {
        let story_id = Uuid::new_v4();

        let digest = command.context_digest.trim();
        if digest.is_empty() {
            return Err(StoryError::InvalidInput(
                "context digest must not be empty".to_string(),
            ));
        }
        let outline: Vec<String> = command
            .outline
            .iter()
            .map(|section| section.trim().to_string())
            .collect();
        if outline.iter().any(String::is_empty) {
            return Err(StoryError::InvalidInput(
                "outline sections must not be blank".to_string(),
            ));
        }

        let draft = self
            .generator
            .compose_draft(&ContextDigest::from_raw(digest), &outline, cancel)
            .await?;

        tracing::info!(
            story_id = %story_id,
            sections = draft.len(),
            chars = draft.full_text().chars().count(),
            "Draft composed"
        );

        Ok(ComposeDraftResponse {
            story_id,
            draft,
            generated_at: Utc::now(),
        })
    }
}

// ============================================================================
// GenerateStory (Orchestrator)
// ============================================================================

/// GenerateStory Handler - 前提 → 计划 → 草稿 → 全文
pub struct GenerateStoryHandler {
    composer: PlanComposer,
    generator: SectionDraftGenerator,
}

impl GenerateStoryHandler {
    pub fn new(backend: Arc<dyn TextGenerationPort>, config: &PipelineConfig) -> Self {
        let caller = BackendCaller::new(backend, config.call_timeout);
        Self {
            composer: PlanComposer::new(caller.clone(), config),
            generator: SectionDraftGenerator::new(caller, config),
        }
    }

    pub async fn handle(
        &self,
        command: GenerateStoryCommand,
        cancel: &CancellationToken,
    ) -> Result<GenerateStoryResponse, StoryError> {
        let story_id = Uuid::new_v4();
        let premise = Premise::new(command.premise)?;
        tracing::info!(story_id = %story_id, premise = %premise, "Generating story");

        let plan = self.composer.compose_plan(&premise, cancel).await?;
        let draft = self
            .generator
            .compose_draft(plan.context_digest(), plan.outline(), cancel)
            .await?;

        tracing::info!(
            story_id = %story_id,
            sections = draft.len(),
            chars = draft.full_text().chars().count(),
            "Story generated"
        );

        Ok(GenerateStoryResponse {
            story_id,
            plan,
            draft,
            generated_at: Utc::now(),
        })
    }
}
