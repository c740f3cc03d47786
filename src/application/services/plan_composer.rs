//! Plan Composer - 故事计划生成
//!
//! 前提 → 背景 → 角色 → 上下文摘要 → 大纲。
//! 三个生成步骤各自走有界重试。

use tokio_util::sync::CancellationToken;

use super::{BackendCaller, PipelineConfig};
use crate::application::error::{Phase, Stage, StoryError};
use crate::application::prompts;
use crate::application::retry::{retry_bounded, RetryPolicy};
use crate::domain::story::{Character, ContextDigest, Premise, StoryPlan};
use crate::domain::text_structure::{
    parse_numbered_items, starts_with_numbered_header, strip_emphasis_runs, truncate_chars,
    NumberedItem,
};

/// 角色名中需要去除的中文标点
const CJK_PUNCTUATION: &[char] = &[
    '，', '。', '、', '：', '；', '！', '？', '（', '）', '「', '」', '『', '』', '“', '”', '‘',
    '’', '《', '》',
];

pub struct PlanComposer {
    caller: BackendCaller,
    retry: RetryPolicy,
    max_setting_chars: usize,
    character_count: usize,
    outline_sections: usize,
}

impl PlanComposer {
    pub fn new(caller: BackendCaller, config: &PipelineConfig) -> Self {
        Self {
            caller,
            retry: RetryPolicy::new(config.max_attempts),
            max_setting_chars: config.max_setting_chars,
            character_count: config.character_count,
            outline_sections: config.outline_sections,
        }
    }

    /// 生成完整的故事计划
    pub async fn compose_plan(
        &self,
        premise: &Premise,
        cancel: &CancellationToken,
    ) -> Result<StoryPlan, StoryError> {
        tracing::info!(premise = %premise, "Composing story plan");

        let setting = self.generate_setting(premise, cancel).await?;
        tracing::info!(setting = %setting, "Setting generated");

        let characters = self.generate_characters(premise, &setting, cancel).await?;
        for character in &characters {
            tracing::info!(name = %character.name, description = %character.description, "Character generated");
        }

        let digest = ContextDigest::compose(premise, &setting, &characters);
        let outline = self.generate_outline(&digest, cancel).await?;
        for (index, section) in outline.iter().enumerate() {
            tracing::info!(section = index, summary = %section, "Outline section generated");
        }

        Ok(StoryPlan::new(premise.clone(), setting, characters, outline)?)
    }

    /// 背景：非空即可，截断后去除强调标记
    async fn generate_setting(
        &self,
        premise: &Premise,
        cancel: &CancellationToken,
    ) -> Result<String, StoryError> {
        let request = prompts::setting_prompt(premise.as_str());
        let max_chars = self.max_setting_chars;

        retry_bounded(
            self.retry,
            Stage::plan(Phase::Setting),
            || self.caller.call(request.clone(), cancel),
            |response| {
                let setting = strip_emphasis_runs(truncate_chars(response.trim(), max_chars));
                let setting = setting.trim();
                if setting.is_empty() {
                    Err("setting response is empty".to_string())
                } else {
                    Ok(setting.to_string())
                }
            },
        )
        .await
    }

    /// 角色：回复必须以序号列表开头，至少解析出一个角色
    async fn generate_characters(
        &self,
        premise: &Premise,
        setting: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Character>, StoryError> {
        let request = prompts::characters_prompt(premise.as_str(), setting, self.character_count);
        let count = self.character_count;

        retry_bounded(
            self.retry,
            Stage::plan(Phase::Characters),
            || self.caller.call(request.clone(), cancel),
            |response| parse_characters(response, count),
        )
        .await
    }

    /// 大纲：只保留标题，数量不足时视为格式错误
    async fn generate_outline(
        &self,
        digest: &ContextDigest,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, StoryError> {
        let request = prompts::outline_prompt(digest.as_str(), self.outline_sections);
        let sections = self.outline_sections;

        retry_bounded(
            self.retry,
            Stage::plan(Phase::Outline),
            || self.caller.call(request.clone(), cancel),
            |response| parse_outline(response, sections),
        )
        .await
    }
}

/// 解析角色列表，最多保留 `count` 个
fn parse_characters(response: &str, count: usize) -> Result<Vec<Character>, String> {
    let cleaned = strip_emphasis_runs(response);
    if !starts_with_numbered_header(&cleaned) {
        return Err("characters response does not start with a numbered list".to_string());
    }

    let characters: Vec<Character> = parse_numbered_items(&cleaned)
        .iter()
        .filter_map(character_from_item)
        .take(count)
        .collect();

    if characters.is_empty() {
        return Err("no character could be parsed".to_string());
    }
    Ok(characters)
}

fn character_from_item(item: &NumberedItem) -> Option<Character> {
    let raw_name = match item.header.split_once(['：', ':']) {
        Some((name, _)) => name,
        None => item.header.split_whitespace().next().unwrap_or_default(),
    };
    let name = clean_name(raw_name);
    if name.is_empty() {
        return None;
    }

    let description = if item.body.is_empty() {
        item.header.clone()
    } else {
        format!("{}\n{}", item.header, item.body)
    };
    Some(Character::new(name, description))
}

/// 去除角色名中的中英文标点
fn clean_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_ascii_punctuation() && !CJK_PUNCTUATION.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// 解析大纲标题，截取前 `sections` 个
fn parse_outline(response: &str, sections: usize) -> Result<Vec<String>, String> {
    let cleaned = strip_emphasis_runs(response);
    let mut outline: Vec<String> = parse_numbered_items(&cleaned)
        .into_iter()
        .map(|item| item.header)
        .filter(|header| !header.is_empty())
        .collect();

    if outline.len() < sections {
        return Err(format!(
            "expected {} outline sections, parsed {}",
            sections,
            outline.len()
        ));
    }
    outline.truncate(sections);
    Ok(outline)
}
