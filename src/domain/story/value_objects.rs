//! Story Context - Value Objects

use serde::{Deserialize, Serialize};

use super::StoryDomainError;

/// 故事前提（用户输入的一句话创意）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Premise(String);

impl Premise {
    pub fn new(premise: impl Into<String>) -> Result<Self, StoryDomainError> {
        let premise = premise.into();
        let trimmed = premise.trim();
        if trimmed.is_empty() {
            return Err(StoryDomainError::EmptyPremise);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Premise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 角色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub description: String,
}

impl Character {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// 上下文摘要
///
/// 计划阶段生成一次，之后作为所有生成调用的共享背景，不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDigest(String);

impl ContextDigest {
    /// 按固定模板由计划内容生成
    pub fn compose(premise: &Premise, setting: &str, characters: &[Character]) -> Self {
        let names = characters
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let descriptions = characters
            .iter()
            .map(|c| c.description.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Self(format!(
            "Premise: {}\n\nSetting: {}\n\nCharacters:\n{}\n\nCharacter details:\n{}",
            premise, setting, names, descriptions
        ))
    }

    /// 使用调用方提供的摘要（起草阶段的入口）
    pub fn from_raw(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContextDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
