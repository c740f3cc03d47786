//! 应用层 - 命令
//!
//! CQRS 命令侧：计划、起草、完整生成

mod story_commands;

pub mod handlers;

pub use story_commands::*;
