//! 故事生成服务
//!
//! - PlanComposer: 前提 → 背景 → 角色 → 大纲
//! - SectionDraftGenerator: 逐段生成候选稿、评分、择优、修订
//! - CandidateScorer: 三个维度的评审打分
//! - ConsistencyRewriter: 一致性修订

mod backend_caller;
mod candidate_scorer;
mod consistency_rewriter;
mod plan_composer;
mod section_draft_generator;

#[cfg(test)]
pub(crate) mod test_support;

use std::time::Duration;

use crate::domain::story::ScoreWeights;

pub use backend_caller::BackendCaller;
pub use candidate_scorer::CandidateScorer;
pub use consistency_rewriter::ConsistencyRewriter;
pub use plan_composer::PlanComposer;
pub use section_draft_generator::SectionDraftGenerator;

/// 流水线配置
///
/// 启动时构建一次，之后只读。
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 计划阶段每一步的最大尝试次数
    pub max_attempts: usize,
    /// 背景最大字符数
    pub max_setting_chars: usize,
    /// 角色数量
    pub character_count: usize,
    /// 大纲段落数
    pub outline_sections: usize,
    /// 每段候选稿数量
    pub candidates_per_section: usize,
    /// 单段内并发的候选稿生成/评分数
    pub max_concurrent: usize,
    /// 单次后端调用超时
    pub call_timeout: Duration,
    /// 评分权重
    pub weights: ScoreWeights,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_setting_chars: 64,
            character_count: 3,
            outline_sections: 5,
            candidates_per_section: 2,
            max_concurrent: 2,
            call_timeout: Duration::from_secs(180),
            weights: ScoreWeights::default(),
        }
    }
}
