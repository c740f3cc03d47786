//! Domain Layer - 领域层
//!
//! - Story Context: 故事计划与逐段起草
//! - Text Structure: 共享的文本结构解析器

pub mod story;
pub mod text_structure;

pub use text_structure::{parse_numbered_items, NumberedItem};
