//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TextGenerationPort）
//! - services: 计划、起草、评分、修订服务
//! - commands: CQRS 命令及处理器
//! - prompts / retry: 提示词模板与有界重试
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod prompts;
pub mod retry;
pub mod services;

// Re-exports
pub use commands::{
    handlers::{ComposeDraftHandler, ComposePlanHandler, GenerateStoryHandler},
    ComposeDraftCommand, ComposeDraftResponse, ComposePlanCommand, ComposePlanResponse,
    GenerateStoryCommand, GenerateStoryResponse,
};

pub use error::{Phase, Stage, StoryError};

pub use ports::{GenerationError, GenerationRequest, TextGenerationPort};

pub use services::PipelineConfig;
