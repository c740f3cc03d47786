//! Dreamloom - 中文故事生成服务
//!
//! 分层架构:
//! - Domain: story/ 计划、段落、评分；text_structure 文本结构解析
//! - Application: services（计划、起草、评分、修订）、commands、ports
//! - Infrastructure: http, adapters/llm

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use dreamloom::application::TextGenerationPort;
use dreamloom::config::{load_config, print_config, LogConfig};
use dreamloom::infrastructure::http::{AppState, HttpServer};
use dreamloom::infrastructure::LlmBackend;

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},dreamloom={},tower_http=debug", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("Dreamloom - 中文故事生成服务");
    print_config(&config);

    let pipeline = config
        .story
        .pipeline_config()
        .map_err(|e| anyhow::anyhow!("Invalid story config: {}", e))?;

    // 创建文本生成后端
    let backend = LlmBackend::from_config(&config.llm)
        .map_err(|e| anyhow::anyhow!("Failed to create LLM backend: {}", e))?;
    tracing::info!(backend = backend.name(), "LLM backend created");
    let backend: Arc<dyn TextGenerationPort> = Arc::new(backend);

    if !backend.health_check().await {
        tracing::warn!("LLM backend health check failed, requests may fail");
    }

    let shutdown = CancellationToken::new();
    let state = AppState::new(backend, &pipeline, shutdown);
    let server = HttpServer::new(config.server.clone(), state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
