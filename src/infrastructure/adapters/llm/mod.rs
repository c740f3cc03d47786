//! LLM Adapter - 文本生成后端实现
//!
//! 后端是一个封闭的集合，由配置中的 provider 选择：
//! - OpenAI 兼容接口（DeepSeek、豆包、OpenAI）
//! - Ollama
//! - Fake（离线固定回复）

mod fake_llm_client;
mod ollama_client;
mod openai_compatible_client;

use async_trait::async_trait;

pub use fake_llm_client::FakeLlmClient;
pub use ollama_client::{OllamaClient, OllamaConfig};
pub use openai_compatible_client::{OpenAiCompatibleClient, OpenAiCompatibleConfig};

use crate::application::ports::{GenerationError, GenerationRequest, TextGenerationPort};
use crate::config::{LlmConfig, LlmProvider};

/// 文本生成后端
pub enum LlmBackend {
    OpenAiCompatible(OpenAiCompatibleClient),
    Ollama(OllamaClient),
    Fake(FakeLlmClient),
}

impl LlmBackend {
    /// 按配置构建后端
    pub fn from_config(config: &LlmConfig) -> Result<Self, GenerationError> {
        let missing = |field: &str| {
            GenerationError::ServiceError(format!(
                "llm.{} is required for provider {}",
                field, config.provider
            ))
        };

        match config.provider {
            LlmProvider::Deepseek | LlmProvider::Doubao | LlmProvider::Openai => {
                let client = OpenAiCompatibleClient::new(OpenAiCompatibleConfig {
                    base_url: config.resolved_base_url().ok_or_else(|| missing("base_url"))?,
                    api_key: config.api_key().map(str::to_string),
                    model: config.resolved_model().ok_or_else(|| missing("model"))?,
                    temperature: config.temperature,
                    timeout_secs: config.timeout_secs,
                })?;
                Ok(Self::OpenAiCompatible(client))
            }
            LlmProvider::Ollama => {
                let client = OllamaClient::new(OllamaConfig {
                    base_url: config.resolved_base_url().ok_or_else(|| missing("base_url"))?,
                    model: config.resolved_model().ok_or_else(|| missing("model"))?,
                    temperature: config.temperature,
                    timeout_secs: config.timeout_secs,
                })?;
                Ok(Self::Ollama(client))
            }
            LlmProvider::Fake => Ok(Self::Fake(FakeLlmClient::new())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAiCompatible(_) => "openai-compatible",
            Self::Ollama(_) => "ollama",
            Self::Fake(_) => "fake",
        }
    }
}

#[async_trait]
impl TextGenerationPort for LlmBackend {
    async fn generate_text(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        match self {
            Self::OpenAiCompatible(client) => client.generate_text(request).await,
            Self::Ollama(client) => client.generate_text(request).await,
            Self::Fake(client) => client.generate_text(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            Self::OpenAiCompatible(client) => client.health_check().await,
            Self::Ollama(client) => client.health_check().await,
            Self::Fake(client) => client.health_check().await,
        }
    }
}
