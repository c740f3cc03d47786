//! Candidate Scorer - 候选稿评分
//!
//! 每个维度单独发起一次评审调用，从回复中提取 "标签：数字"，
//! 钳制到 [1, 10] 后按权重加权。评分不重试。

use tokio_util::sync::CancellationToken;

use super::BackendCaller;
use crate::application::error::{Phase, Stage, StoryError};
use crate::application::prompts;
use crate::domain::story::{CriticScores, ScoreDimension, ScoreWeights, SectionContext};
use crate::domain::text_structure::extract_labeled_number;

pub struct CandidateScorer {
    caller: BackendCaller,
    weights: ScoreWeights,
}

impl CandidateScorer {
    pub fn new(caller: BackendCaller, weights: ScoreWeights) -> Self {
        Self { caller, weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// 依次请求三个维度的评分
    pub async fn evaluate(
        &self,
        ctx: &SectionContext,
        candidate: &str,
        cancel: &CancellationToken,
    ) -> Result<CriticScores, StoryError> {
        let stage = Stage::section(Phase::Scoring, ctx.index);
        let mut values = [0.0_f64; 3];

        for (slot, dimension) in values.iter_mut().zip(ScoreDimension::ALL) {
            let request = prompts::critic_prompt(ctx, candidate, dimension);
            let response = self
                .caller
                .call(request, cancel)
                .await
                .map_err(|e| StoryError::generation(stage, e))?;

            *slot = extract_labeled_number(&response, dimension.label()).ok_or_else(|| {
                StoryError::ScoreParse {
                    stage,
                    dimension,
                    response: response.clone(),
                }
            })?;
        }

        let [coherence, quality, fluency] = values;
        let scores = CriticScores::new(coherence, quality, fluency);
        tracing::debug!(
            section = ctx.index,
            coherence = scores.get(ScoreDimension::Coherence),
            quality = scores.get(ScoreDimension::Quality),
            fluency = scores.get(ScoreDimension::Fluency),
            "Candidate evaluated"
        );
        Ok(scores)
    }

    /// 加权总分
    pub async fn score(
        &self,
        ctx: &SectionContext,
        candidate: &str,
        cancel: &CancellationToken,
    ) -> Result<f64, StoryError> {
        let scores = self.evaluate(ctx, candidate, cancel).await?;
        Ok(scores.aggregate(&self.weights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::GenerationError;
    use crate::application::prompts::PromptKind;
    use crate::application::services::test_support::{caller, ScriptedBackend};
    use crate::domain::story::ContextDigest;

    fn ctx() -> SectionContext {
        let outline = vec!["开端".to_string(), "结局".to_string()];
        SectionContext::build(0, &outline, None, &ContextDigest::from_raw("DIGEST"))
    }

    fn critic_backend(
        coherence: &'static str,
        quality: &'static str,
        fluency: &'static str,
    ) -> std::sync::Arc<ScriptedBackend> {
        ScriptedBackend::new(move |kind, _| match kind {
            Some(PromptKind::Critic(ScoreDimension::Coherence)) => Ok(coherence.to_string()),
            Some(PromptKind::Critic(ScoreDimension::Quality)) => Ok(quality.to_string()),
            Some(PromptKind::Critic(ScoreDimension::Fluency)) => Ok(fluency.to_string()),
            _ => Err(GenerationError::ServiceError("unexpected".into())),
        })
    }

    #[tokio::test]
    async fn test_weighted_score() {
        let backend = critic_backend("连贯性：8.0", "分析如下……\n内容质量:6", "表达流畅度：7.5");
        let scorer = CandidateScorer::new(caller(backend.clone()), ScoreWeights::default());

        let score = scorer.score(&ctx(), "候选稿", &CancellationToken::new()).await.unwrap();

        // 0.4 * 8 + 0.3 * 6 + 0.3 * 7.5
        assert!((score - 7.25).abs() < 1e-9);
        assert_eq!(backend.total_calls(), 3);
        assert!(backend.prompts(PromptKind::Critic(ScoreDimension::Quality))[0].contains("候选稿"));
    }

    #[tokio::test]
    async fn test_scores_are_clamped() {
        let backend = critic_backend("连贯性：15", "内容质量：0.2", "表达流畅度：10");
        let scorer = CandidateScorer::new(caller(backend), ScoreWeights::default());

        let scores = scorer.evaluate(&ctx(), "候选稿", &CancellationToken::new()).await.unwrap();

        assert_eq!(scores.get(ScoreDimension::Coherence), 10.0);
        assert_eq!(scores.get(ScoreDimension::Quality), 1.0);
    }

    #[tokio::test]
    async fn test_missing_label_is_score_parse_error() {
        let backend = critic_backend("连贯性：8", "我觉得写得不错", "表达流畅度：7");
        let scorer = CandidateScorer::new(caller(backend.clone()), ScoreWeights::default());

        let err = scorer.score(&ctx(), "候选稿", &CancellationToken::new()).await.unwrap_err();

        match err {
            StoryError::ScoreParse { dimension, stage, response } => {
                assert_eq!(dimension, ScoreDimension::Quality);
                assert_eq!(stage, Stage::section(Phase::Scoring, 0));
                assert_eq!(response, "我觉得写得不错");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // 解析失败后不再请求后续维度
        assert_eq!(backend.count(PromptKind::Critic(ScoreDimension::Fluency)), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_is_generation_error() {
        let backend = ScriptedBackend::new(|_, _| Err(GenerationError::Timeout));
        let scorer = CandidateScorer::new(caller(backend.clone()), ScoreWeights::default());

        let err = scorer.score(&ctx(), "候选稿", &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, StoryError::Generation { source: GenerationError::Timeout, .. }));
        assert_eq!(backend.total_calls(), 1);
    }
}
