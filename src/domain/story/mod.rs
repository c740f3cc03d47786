//! Story Context - 故事限界上下文
//!
//! 职责:
//! - 故事计划聚合（前提、背景、角色、大纲、上下文摘要）
//! - 段落上下文与候选稿实体
//! - 评分维度与加权规则

mod aggregate;
mod entities;
mod errors;
mod scoring;
mod value_objects;

pub use aggregate::{Draft, StoryPlan};
pub use entities::{Candidate, SectionContext, SectionPosition};
pub use errors::StoryDomainError;
pub use scoring::{clamp_score, CriticScores, ScoreDimension, ScoreWeights, MAX_SCORE, MIN_SCORE};
pub use value_objects::{Character, ContextDigest, Premise};
