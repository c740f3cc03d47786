//! Text Generation Port - 文本生成后端抽象
//!
//! 定义文本生成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 文本生成错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request cancelled")]
    Cancelled,
}

/// 文本生成请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// 系统指令（可选）
    pub system_instruction: Option<String>,
    /// 用户提示词
    pub user_prompt: String,
}

impl GenerationRequest {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            system_instruction: None,
            user_prompt: user_prompt.into(),
        }
    }

    pub fn with_system(mut self, system_instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(system_instruction.into());
        self
    }
}

/// Text Generation Port
///
/// 一次调用：一段提示词进，一段文本出
#[async_trait]
pub trait TextGenerationPort: Send + Sync {
    /// 生成文本
    async fn generate_text(&self, request: GenerationRequest) -> Result<String, GenerationError>;

    /// 检查后端是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
