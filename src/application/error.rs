//! 应用层错误定义
//!
//! 故事生成流水线的统一错误类型。每个错误都带有出错的阶段，
//! 起草阶段的错误还带有段落序号。

use thiserror::Error;

use crate::application::ports::GenerationError;
use crate::domain::story::{ScoreDimension, StoryDomainError};

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Setting,
    Characters,
    Outline,
    Candidate,
    Scoring,
    Rewrite,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setting => "setting",
            Phase::Characters => "characters",
            Phase::Outline => "outline",
            Phase::Candidate => "candidate",
            Phase::Scoring => "scoring",
            Phase::Rewrite => "rewrite",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 出错位置：阶段 + 可选的段落序号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub phase: Phase,
    pub section: Option<usize>,
}

impl Stage {
    pub fn plan(phase: Phase) -> Self {
        Self {
            phase,
            section: None,
        }
    }

    pub fn section(phase: Phase, index: usize) -> Self {
        Self {
            phase,
            section: Some(index),
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.section {
            Some(index) => write!(f, "{} (section {})", self.phase, index),
            None => write!(f, "{}", self.phase),
        }
    }
}

/// 故事生成错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoryError {
    /// 后端调用失败
    #[error("Generation failed at {stage}: {source}")]
    Generation {
        stage: Stage,
        #[source]
        source: GenerationError,
    },

    /// 后端有回复，但格式无法解析
    #[error("Validation failed at {stage}: {message}")]
    Validation { stage: Stage, message: String },

    /// 评审回复中缺少带标签的分数
    #[error("Score parse failed at {stage}: no {dimension} score in critic response")]
    ScoreParse {
        stage: Stage,
        dimension: ScoreDimension,
        response: String,
    },

    /// 调用方取消
    #[error("Cancelled at {stage}")]
    Cancelled { stage: Stage },

    /// 输入无效
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StoryError {
    pub fn generation(stage: Stage, source: GenerationError) -> Self {
        match source {
            GenerationError::Cancelled => Self::Cancelled { stage },
            source => Self::Generation { stage, source },
        }
    }

    pub fn validation(stage: Stage, message: impl Into<String>) -> Self {
        Self::Validation {
            stage,
            message: message.into(),
        }
    }

    /// 出错阶段（输入错误没有阶段）
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Generation { stage, .. }
            | Self::Validation { stage, .. }
            | Self::ScoreParse { stage, .. }
            | Self::Cancelled { stage } => Some(*stage),
            Self::InvalidInput(_) => None,
        }
    }

    /// 计划阶段的有界重试是否适用
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Generation { .. } | Self::Validation { .. })
    }
}

impl From<StoryDomainError> for StoryError {
    fn from(err: StoryDomainError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_generation_maps_to_cancelled() {
        let err = StoryError::generation(Stage::plan(Phase::Setting), GenerationError::Cancelled);
        assert!(matches!(err, StoryError::Cancelled { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_display_includes_section() {
        let err = StoryError::generation(Stage::section(Phase::Rewrite, 2), GenerationError::Timeout);
        assert_eq!(
            err.to_string(),
            "Generation failed at rewrite (section 2): Request timeout"
        );
        assert_eq!(err.stage().and_then(|s| s.section), Some(2));
    }

    #[test]
    fn test_retryable_kinds() {
        let stage = Stage::plan(Phase::Outline);
        assert!(StoryError::validation(stage, "empty").is_retryable());
        assert!(!StoryError::ScoreParse {
            stage,
            dimension: ScoreDimension::Fluency,
            response: String::new(),
        }
        .is_retryable());
    }
}
