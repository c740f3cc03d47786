//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

use crate::application::services::PipelineConfig;
use crate::domain::story::{ScoreWeights, StoryDomainError};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 文本生成后端配置
    #[serde(default)]
    pub llm: LlmConfig,

    /// 故事生成流水线配置
    #[serde(default)]
    pub story: StoryConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 文本生成后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Deepseek,
    Doubao,
    Openai,
    Ollama,
    /// 离线的固定回复后端
    Fake,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deepseek => "deepseek",
            Self::Doubao => "doubao",
            Self::Openai => "openai",
            Self::Ollama => "ollama",
            Self::Fake => "fake",
        }
    }

    /// 默认服务地址
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            Self::Deepseek => Some("https://api.deepseek.com"),
            Self::Doubao => Some("https://ark.cn-beijing.volces.com/api/v3"),
            Self::Openai => Some("https://api.openai.com/v1"),
            Self::Ollama => Some("http://localhost:11434"),
            Self::Fake => None,
        }
    }

    /// 默认模型（豆包需要显式配置接入点 ID）
    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            Self::Deepseek => Some("deepseek-chat"),
            Self::Doubao => None,
            Self::Openai => Some("gpt-4o-mini"),
            Self::Ollama => Some("qwen2.5"),
            Self::Fake => Some("fake"),
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Deepseek | Self::Doubao | Self::Openai)
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 文本生成后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    /// 服务地址，未设置时使用 provider 的默认地址
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    /// 模型名，未设置时使用 provider 的默认模型
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP 请求超时时间（秒）
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.8
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: None,
            api_key: None,
            model: None,
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    /// 实际使用的服务地址
    pub fn resolved_base_url(&self) -> Option<String> {
        self.base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.provider.default_base_url().map(str::to_string))
    }

    /// 实际使用的模型
    pub fn resolved_model(&self) -> Option<String> {
        self.model
            .clone()
            .filter(|model| !model.trim().is_empty())
            .or_else(|| self.provider.default_model().map(str::to_string))
    }

    /// 已配置且非空的 API Key
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

/// 评分权重配置
#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_coherence_weight")]
    pub coherence: f64,

    #[serde(default = "default_quality_weight")]
    pub quality: f64,

    #[serde(default = "default_fluency_weight")]
    pub fluency: f64,
}

fn default_coherence_weight() -> f64 {
    0.4
}

fn default_quality_weight() -> f64 {
    0.3
}

fn default_fluency_weight() -> f64 {
    0.3
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            coherence: default_coherence_weight(),
            quality: default_quality_weight(),
            fluency: default_fluency_weight(),
        }
    }
}

impl WeightsConfig {
    pub fn to_weights(&self) -> Result<ScoreWeights, StoryDomainError> {
        ScoreWeights::new(self.coherence, self.quality, self.fluency)
    }
}

/// 故事生成流水线配置
#[derive(Debug, Clone, Deserialize)]
pub struct StoryConfig {
    /// 计划阶段每一步的最大尝试次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// 背景最大字符数
    #[serde(default = "default_max_setting_chars")]
    pub max_setting_chars: usize,

    /// 角色数量
    #[serde(default = "default_character_count")]
    pub character_count: usize,

    /// 大纲段落数
    #[serde(default = "default_outline_sections")]
    pub outline_sections: usize,

    /// 每段候选稿数量
    #[serde(default = "default_candidates_per_section")]
    pub candidates_per_section: usize,

    /// 单段内并发的候选稿数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 单次后端调用超时（秒）
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    #[serde(default)]
    pub weights: WeightsConfig,
}

fn default_max_attempts() -> usize {
    3
}

fn default_max_setting_chars() -> usize {
    64
}

fn default_character_count() -> usize {
    3
}

fn default_outline_sections() -> usize {
    5
}

fn default_candidates_per_section() -> usize {
    2
}

fn default_max_concurrent() -> usize {
    2
}

fn default_call_timeout() -> u64 {
    180
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            max_setting_chars: default_max_setting_chars(),
            character_count: default_character_count(),
            outline_sections: default_outline_sections(),
            candidates_per_section: default_candidates_per_section(),
            max_concurrent: default_max_concurrent(),
            call_timeout_secs: default_call_timeout(),
            weights: WeightsConfig::default(),
        }
    }
}

impl StoryConfig {
    /// 转换为流水线配置（权重无效时报错）
    pub fn pipeline_config(&self) -> Result<PipelineConfig, StoryDomainError> {
        Ok(PipelineConfig {
            max_attempts: self.max_attempts,
            max_setting_chars: self.max_setting_chars,
            character_count: self.character_count,
            outline_sections: self.outline_sections,
            candidates_per_section: self.candidates_per_section,
            max_concurrent: self.max_concurrent,
            call_timeout: Duration::from_secs(self.call_timeout_secs),
            weights: self.weights.to_weights()?,
        })
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
