//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "DREAMLOOM";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `DREAMLOOM_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `DREAMLOOM_SERVER__PORT=8080`
/// - `DREAMLOOM_LLM__PROVIDER=ollama`
/// - `DREAMLOOM_LLM__API_KEY=sk-...`
/// - `DREAMLOOM_STORY__CANDIDATES_PER_SECTION=3`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("llm.provider", "deepseek")?
        .set_default("llm.temperature", 0.8)?
        .set_default("llm.timeout_secs", 120)?
        .set_default("story.max_attempts", 3)?
        .set_default("story.max_setting_chars", 64)?
        .set_default("story.character_count", 3)?
        .set_default("story.outline_sections", 5)?
        .set_default("story.candidates_per_section", 2)?
        .set_default("story.max_concurrent", 2)?
        .set_default("story.call_timeout_secs", 180)?
        .set_default("story.weights.coherence", 0.4)?
        .set_default("story.weights.quality", 0.3)?
        .set_default("story.weights.fluency", 0.3)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: DREAMLOOM_LLM__BASE_URL=http://localhost:11434
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    let story = &config.story;
    let counts = [
        ("story.max_attempts", story.max_attempts),
        ("story.max_setting_chars", story.max_setting_chars),
        ("story.character_count", story.character_count),
        ("story.outline_sections", story.outline_sections),
        ("story.candidates_per_section", story.candidates_per_section),
        ("story.max_concurrent", story.max_concurrent),
    ];
    if let Some((name, _)) = counts.iter().find(|(_, value)| *value == 0) {
        return Err(ConfigError::ValidationError(format!("{} cannot be 0", name)));
    }

    if story.call_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "story.call_timeout_secs cannot be 0".to_string(),
        ));
    }

    story
        .weights
        .to_weights()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    let llm = &config.llm;
    if llm.resolved_base_url().is_none() && llm.provider != super::LlmProvider::Fake {
        return Err(ConfigError::ValidationError(format!(
            "llm.base_url is required for provider {}",
            llm.provider
        )));
    }
    if llm.resolved_model().is_none() {
        return Err(ConfigError::ValidationError(format!(
            "llm.model is required for provider {}",
            llm.provider
        )));
    }
    if llm.provider.requires_api_key() && llm.api_key().is_none() {
        return Err(ConfigError::ValidationError(format!(
            "llm.api_key is required for provider {}",
            llm.provider
        )));
    }

    Ok(())
}

/// 隐藏 API Key，只保留末尾 4 位
fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    let llm = &config.llm;
    let story = &config.story;

    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("LLM Provider: {}", llm.provider);
    tracing::info!("LLM Base URL: {}", llm.resolved_base_url().unwrap_or_default());
    tracing::info!("LLM Model: {}", llm.resolved_model().unwrap_or_default());
    tracing::info!(
        "LLM API Key: {}",
        llm.api_key().map(redact).unwrap_or_else(|| "<none>".to_string())
    );
    tracing::info!("LLM Timeout: {}s", llm.timeout_secs);
    tracing::info!(
        "Story: {} characters, {} sections, {} candidates/section",
        story.character_count,
        story.outline_sections,
        story.candidates_per_section
    );
    tracing::info!(
        "Story Attempts: {}, Max Concurrent: {}, Call Timeout: {}s",
        story.max_attempts,
        story.max_concurrent,
        story.call_timeout_secs
    );
    tracing::info!(
        "Score Weights: coherence={} quality={} fluency={}",
        story.weights.coherence,
        story.weights.quality,
        story.weights.fluency
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;
    use std::io::Write;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-test-key".to_string());
        config
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = valid_config();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_counts() {
        let mut config = valid_config();
        config.story.candidates_per_section = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("story.candidates_per_section"));
    }

    #[test]
    fn test_validation_error_for_bad_weights() {
        let mut config = valid_config();
        config.story.weights.fluency = 0.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_requires_api_key() {
        let config = AppConfig::default();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn test_fake_and_ollama_need_no_key() {
        let mut config = AppConfig::default();
        config.llm.provider = LlmProvider::Fake;
        assert!(validate_config(&config).is_ok());

        config.llm.provider = LlmProvider::Ollama;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_doubao_requires_model() {
        let mut config = valid_config();
        config.llm.provider = LlmProvider::Doubao;
        assert!(validate_config(&config).is_err());

        config.llm.model = Some("ep-20241213180423-txjtj".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact("sk-1234567890"), "****7890");
        assert_eq!(redact("abc"), "****");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8088

[llm]
provider = "ollama"
model = "qwen2.5:7b"

[story]
outline_sections = 4
candidates_per_section = 3

[story.weights]
coherence = 0.5
quality = 0.25
fluency = 0.25
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.provider, LlmProvider::Ollama);
        assert_eq!(config.llm.resolved_model().as_deref(), Some("qwen2.5:7b"));
        assert_eq!(config.story.outline_sections, 4);
        assert_eq!(config.story.candidates_per_section, 3);
        assert_eq!(config.story.max_attempts, 3);
        assert_eq!(config.story.weights.coherence, 0.5);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[llm]\nprovider = \"fake\"\n\n[story]\nmax_concurrent = 0").unwrap();

        let err = load_config_from_path(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
