//! Consistency Rewriter - 一致性修订
//!
//! 把选中的候选稿连同段落上下文交给编辑模型，修正人物、地点、
//! 时间线上的不一致。回复去掉引导标签和强调标记后即为本段定稿。

use tokio_util::sync::CancellationToken;

use super::BackendCaller;
use crate::application::error::{Phase, Stage, StoryError};
use crate::application::prompts::{self, REWRITE_LEAD_LABELS};
use crate::domain::story::SectionContext;
use crate::domain::text_structure::{strip_emphasis_runs, strip_leading_label};

pub struct ConsistencyRewriter {
    caller: BackendCaller,
}

impl ConsistencyRewriter {
    pub fn new(caller: BackendCaller) -> Self {
        Self { caller }
    }

    /// 修订一段候选稿，返回定稿文本（单次调用，不重试）
    pub async fn reconcile(
        &self,
        ctx: &SectionContext,
        candidate: &str,
        cancel: &CancellationToken,
    ) -> Result<String, StoryError> {
        let stage = Stage::section(Phase::Rewrite, ctx.index);
        let request = prompts::rewrite_prompt(ctx, candidate);

        let response = self
            .caller
            .call(request, cancel)
            .await
            .map_err(|e| StoryError::generation(stage, e))?;

        let finalized = clean_rewrite(&response);
        if finalized.is_empty() {
            return Err(StoryError::validation(stage, "rewrite response is empty"));
        }

        tracing::debug!(
            section = ctx.index,
            candidate_len = candidate.chars().count(),
            finalized_len = finalized.chars().count(),
            "Section reconciled"
        );
        Ok(finalized)
    }
}

fn clean_rewrite(response: &str) -> String {
    let unlabeled = strip_leading_label(response.trim_start(), REWRITE_LEAD_LABELS);
    strip_emphasis_runs(unlabeled).trim().to_string()
}
