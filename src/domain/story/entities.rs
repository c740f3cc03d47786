//! Story Context - Entities

use super::{ContextDigest, CriticScores};

/// 段落在大纲中的位置，决定使用哪一套起草模板
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionPosition {
    /// 没有前一段（含只有一段的大纲）
    Opening,
    /// 前后都有
    Middle,
    /// 有前一段，没有后一段
    Closing,
}

/// 段落上下文
///
/// 每段重新构建。只依赖相邻段的大纲和前一段的最终文本，
/// 不会看到候选稿或更早的段落。
#[derive(Debug, Clone, PartialEq)]
pub struct SectionContext {
    pub index: usize,
    pub current_summary: String,
    pub previous_summary: Option<String>,
    pub previous_finalized_text: Option<String>,
    pub next_summary: Option<String>,
    pub context_digest: ContextDigest,
}

impl SectionContext {
    /// 为第 `index` 段构建上下文
    ///
    /// `previous_finalized_text` 只在 `index > 0` 时生效。
    pub fn build(
        index: usize,
        outline: &[String],
        previous_finalized_text: Option<&str>,
        context_digest: &ContextDigest,
    ) -> Self {
        let previous_summary = index
            .checked_sub(1)
            .and_then(|prev| outline.get(prev))
            .cloned();
        let previous_finalized_text = previous_summary
            .as_ref()
            .and(previous_finalized_text)
            .map(str::to_string);

        Self {
            index,
            current_summary: outline.get(index).cloned().unwrap_or_default(),
            previous_summary,
            previous_finalized_text,
            next_summary: outline.get(index + 1).cloned(),
            context_digest: context_digest.clone(),
        }
    }

    pub fn position(&self) -> SectionPosition {
        match (&self.previous_summary, &self.next_summary) {
            (None, _) => SectionPosition::Opening,
            (Some(_), Some(_)) => SectionPosition::Middle,
            (Some(_), None) => SectionPosition::Closing,
        }
    }
}

/// 候选稿
///
/// 选出本段胜者后即被丢弃。
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// 生成顺序
    pub index: usize,
    pub text: String,
    pub scores: CriticScores,
    pub aggregate_score: f64,
}

impl Candidate {
    /// 选出总分严格最高的候选稿；分数相同时保留最早生成的
    pub fn select_best(candidates: Vec<Candidate>) -> Option<Candidate> {
        candidates.into_iter().fold(None, |best, candidate| match best {
            Some(current) if candidate.aggregate_score <= current.aggregate_score => Some(current),
            _ => Some(candidate),
        })
    }
}
