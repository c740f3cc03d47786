//! Story Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoryDomainError {
    #[error("故事前提不能为空")]
    EmptyPremise,

    #[error("大纲不能为空")]
    EmptyOutline,

    #[error("无效的评分权重: {0}")]
    InvalidWeights(String),
}
