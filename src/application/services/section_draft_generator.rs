//! Section Draft Generator - 逐段起草
//!
//! 段落严格按大纲顺序处理，第 i 段的上下文只包含第 i-1 段的定稿。
//! 每段内：
//! 1. 生成 C 份候选稿（生成 + 评分为一个单元，单元之间受信号量限制并发）
//!    评审看到的是模型的原始回复
//! 2. 按总分选出最高者，分数相同时保留最早生成的
//! 3. 只清理胜出的候选稿，交给一致性修订，得到本段定稿
//!
//! 任何一次调用失败都会终止整个起草过程，不返回部分结果。

use futures_util::future::try_join_all;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use super::{BackendCaller, CandidateScorer, ConsistencyRewriter, PipelineConfig};
use crate::application::error::{Phase, Stage, StoryError};
use crate::application::prompts;
use crate::domain::story::{Candidate, ContextDigest, Draft, SectionContext};
use crate::domain::text_structure::{normalize_whitespace, strip_emphasis_runs, strip_ordinal_prefix};

pub struct SectionDraftGenerator {
    caller: BackendCaller,
    scorer: CandidateScorer,
    rewriter: ConsistencyRewriter,
    candidates_per_section: usize,
    max_concurrent: usize,
}

impl SectionDraftGenerator {
    pub fn new(caller: BackendCaller, config: &PipelineConfig) -> Self {
        Self {
            scorer: CandidateScorer::new(caller.clone(), config.weights),
            rewriter: ConsistencyRewriter::new(caller.clone()),
            caller,
            candidates_per_section: config.candidates_per_section.max(1),
            max_concurrent: config.max_concurrent.max(1),
        }
    }

    /// 按大纲逐段生成定稿
    pub async fn compose_draft(
        &self,
        context_digest: &ContextDigest,
        outline: &[String],
        cancel: &CancellationToken,
    ) -> Result<Draft, StoryError> {
        if outline.is_empty() {
            return Err(StoryError::InvalidInput("outline must not be empty".to_string()));
        }

        tracing::info!(
            sections = outline.len(),
            candidates_per_section = self.candidates_per_section,
            "Composing draft"
        );

        let mut draft = Draft::with_capacity(outline.len());
        for index in 0..outline.len() {
            let ctx = SectionContext::build(index, outline, draft.last_section(), context_digest);
            let finalized = self.compose_section(&ctx, cancel).await?;

            tracing::info!(
                section = index,
                chars = finalized.chars().count(),
                "Section finalized"
            );
            draft.push(finalized);
        }

        Ok(draft)
    }

    async fn compose_section(
        &self,
        ctx: &SectionContext,
        cancel: &CancellationToken,
    ) -> Result<String, StoryError> {
        let semaphore = Semaphore::new(self.max_concurrent);
        let units = (0..self.candidates_per_section)
            .map(|index| self.candidate_unit(index, ctx, &semaphore, cancel));

        // 结果顺序与生成顺序一致
        let candidates = try_join_all(units).await?;
        let best = Candidate::select_best(candidates).ok_or_else(|| {
            StoryError::validation(Stage::section(Phase::Candidate, ctx.index), "no candidate produced")
        })?;

        tracing::info!(
            section = ctx.index,
            candidate = best.index,
            score = best.aggregate_score,
            "Best candidate selected"
        );

        let cleaned = clean_candidate(&best.text);
        self.rewriter.reconcile(ctx, &cleaned, cancel).await
    }

    /// 生成一份候选稿并按原文评分
    async fn candidate_unit(
        &self,
        index: usize,
        ctx: &SectionContext,
        semaphore: &Semaphore,
        cancel: &CancellationToken,
    ) -> Result<Candidate, StoryError> {
        let stage = Stage::section(Phase::Candidate, ctx.index);
        let _permit = semaphore
            .acquire()
            .await
            .map_err(|_| StoryError::Cancelled { stage })?;

        let response = self
            .caller
            .call(prompts::section_prompt(ctx), cancel)
            .await
            .map_err(|e| StoryError::generation(stage, e))?;

        let scores = self.scorer.evaluate(ctx, &response, cancel).await?;
        let aggregate_score = scores.aggregate(self.scorer.weights());

        tracing::debug!(
            section = ctx.index,
            candidate = index,
            score = aggregate_score,
            "Candidate scored"
        );

        Ok(Candidate {
            index,
            text: response,
            scores,
            aggregate_score,
        })
    }
}

/// 候选稿清理：强调标记、开头序号或大纲标签、多余空白
fn clean_candidate(response: &str) -> String {
    let unmarked = strip_emphasis_runs(response);
    normalize_whitespace(strip_ordinal_prefix(unmarked.trim()))
}
