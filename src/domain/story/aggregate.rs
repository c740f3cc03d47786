//! Story Context - Aggregate Root

use serde::Serialize;

use super::{Character, ContextDigest, Premise, StoryDomainError};
use crate::domain::text_structure::render_numbered_list;

/// StoryPlan 聚合根
///
/// 不变量:
/// - 大纲长度在计划生命周期内固定，且不为空
/// - context_digest 在创建时计算一次，之后不可修改
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryPlan {
    premise: Premise,
    setting: String,
    characters: Vec<Character>,
    outline: Vec<String>,
    context_digest: ContextDigest,
}

impl StoryPlan {
    pub fn new(
        premise: Premise,
        setting: String,
        characters: Vec<Character>,
        outline: Vec<String>,
    ) -> Result<Self, StoryDomainError> {
        if outline.is_empty() {
            return Err(StoryDomainError::EmptyOutline);
        }
        let context_digest = ContextDigest::compose(&premise, &setting, &characters);
        Ok(Self {
            premise,
            setting,
            characters,
            outline,
            context_digest,
        })
    }

    // Getters
    pub fn premise(&self) -> &Premise {
        &self.premise
    }

    pub fn setting(&self) -> &str {
        &self.setting
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn outline(&self) -> &[String] {
        &self.outline
    }

    pub fn context_digest(&self) -> &ContextDigest {
        &self.context_digest
    }

    pub fn section_count(&self) -> usize {
        self.outline.len()
    }

    /// 大纲的 `1. xxx` 文本形式
    pub fn outline_text(&self) -> String {
        render_numbered_list(&self.outline)
    }
}

/// 草稿：按顺序排列的各段最终文本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    sections: Vec<String>,
}

impl Draft {
    pub fn with_capacity(sections: usize) -> Self {
        Self {
            sections: Vec::with_capacity(sections),
        }
    }

    pub fn push(&mut self, finalized_text: String) {
        self.sections.push(finalized_text);
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    /// 最近一段的最终文本
    pub fn last_section(&self) -> Option<&str> {
        self.sections.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// 各段直接拼接后的全文
    pub fn full_text(&self) -> String {
        self.sections.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_requires_outline() {
        let premise = Premise::new("迷路的女孩").unwrap();
        let result = StoryPlan::new(premise, "森林".into(), Vec::new(), Vec::new());
        assert_eq!(result, Err(StoryDomainError::EmptyOutline));
    }

    #[test]
    fn test_plan_digest_computed_once() {
        let premise = Premise::new("迷路的女孩").unwrap();
        let characters = vec![Character::new("小红", "小红：勇敢")];
        let plan = StoryPlan::new(
            premise.clone(),
            "森林".into(),
            characters.clone(),
            vec!["迷路".into(), "回家".into()],
        )
        .unwrap();

        assert_eq!(plan.section_count(), 2);
        assert_eq!(
            plan.context_digest(),
            &ContextDigest::compose(&premise, "森林", &characters)
        );
        assert_eq!(plan.outline_text(), "1. 迷路\n2. 回家");
    }

    #[test]
    fn test_draft_concatenates_sections() {
        let mut draft = Draft::with_capacity(2);
        draft.push("第一段。".into());
        draft.push("第二段。".into());

        assert_eq!(draft.len(), 2);
        assert_eq!(draft.last_section(), Some("第二段。"));
        assert_eq!(draft.full_text(), "第一段。第二段。");
    }
}
