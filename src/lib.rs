//! Dreamloom - 中文故事生成
//!
//! 一句话前提 → 背景、角色、大纲 → 逐段起草、评分、择优、一致性修订 → 全文
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Story Context: 故事计划、段落上下文、候选稿、评分规则
//! - Text Structure: 模型自由文本的结构解析
//!
//! 应用层 (application/):
//! - Ports: TextGenerationPort
//! - Services: PlanComposer, SectionDraftGenerator, CandidateScorer, ConsistencyRewriter
//! - Commands: CQRS 命令处理器（GenerateStoryHandler 为完整流水线）
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: OpenAI 兼容客户端、Ollama 客户端、Fake 客户端
//! - HTTP: RESTful API

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
