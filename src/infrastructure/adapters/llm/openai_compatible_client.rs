//! OpenAI-Compatible Client - 调用 chat/completions 接口
//!
//! 实现 TextGenerationPort trait，适用于 DeepSeek、豆包（方舟）、OpenAI 等兼容服务
//!
//! POST {base_url}/chat/completions
//! Request: {"model": "...", "messages": [{"role": "system", ...}, {"role": "user", ...}], "temperature": 0.8}
//! Response: {"choices": [{"message": {"content": "..."}}]}

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{GenerationError, GenerationRequest, TextGenerationPort};

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// 客户端配置
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// 服务基础 URL（可以直接给出完整的 chat/completions 地址）
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com".to_string(),
            api_key: None,
            model: "deepseek-chat".to_string(),
            temperature: 0.8,
            timeout_secs: 120,
        }
    }
}

impl OpenAiCompatibleConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// chat/completions 完整地址
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with(CHAT_COMPLETIONS_PATH) {
            base.to_string()
        } else {
            format!("{}{}", base, CHAT_COMPLETIONS_PATH)
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: String,
}

/// OpenAI 兼容客户端
pub struct OpenAiCompatibleClient {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleClient {
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn headers(&self) -> Result<HeaderMap, GenerationError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| GenerationError::ServiceError(format!("Invalid API key: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

/// 从响应体中取出第一条回复
fn parse_chat_response(body: &str) -> Result<String, GenerationError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("Malformed chat response: {}", e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| GenerationError::InvalidResponse("Missing choices".to_string()))
}

pub(super) fn map_reqwest_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else if e.is_connect() {
        GenerationError::NetworkError(format!("Cannot connect to LLM service: {}", e))
    } else {
        GenerationError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl TextGenerationPort for OpenAiCompatibleClient {
    async fn generate_text(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_instruction {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.user_prompt,
        });

        let body = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            stream: false,
        };

        let endpoint = self.config.endpoint();
        tracing::debug!(url = %endpoint, model = %self.config.model, "Sending chat completion request");

        let response = self
            .client
            .post(&endpoint)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GenerationError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let text = response.text().await.map_err(map_reqwest_error)?;
        let content = parse_chat_response(&text)?;

        tracing::debug!(response_len = content.len(), "Chat completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_building() {
        let config = OpenAiCompatibleConfig::new("https://ark.cn-beijing.volces.com/api/v3/", "ep-1");
        assert_eq!(
            config.endpoint(),
            "https://ark.cn-beijing.volces.com/api/v3/chat/completions"
        );

        let config = OpenAiCompatibleConfig::new("https://api.deepseek.com/chat/completions", "deepseek-chat");
        assert_eq!(config.endpoint(), "https://api.deepseek.com/chat/completions");
    }

    #[test]
    fn test_parse_chat_response() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"这个故事发生在海边"}}]}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "这个故事发生在海边");

        let err = parse_chat_response(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));

        let err = parse_chat_response("not json").unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse(_)));
    }

    #[test]
    fn test_bearer_header() {
        let client = OpenAiCompatibleClient::new(OpenAiCompatibleConfig::default().with_api_key("sk-test")).unwrap();
        let headers = client.headers().unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer sk-test");
    }
}
