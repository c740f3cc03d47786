//! Fake LLM Client - 离线运行与测试用的文本生成后端
//!
//! 不调用任何外部服务，按提示词类别返回固定格式的文本：
//! 背景、角色列表、大纲、段落正文、评分、修订结果。

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::application::ports::{GenerationError, GenerationRequest, TextGenerationPort};
use crate::application::prompts::PromptKind;
use crate::domain::story::ScoreDimension;

const SETTING: &str = "一座被海雾笼罩的小镇，**灯塔**每晚都会亮起，镇上的人相信梦会通向另一个世界";

const CHARACTERS: &[(&str, &str)] = &[
    ("林宇", "年轻的程序员，发现自己能在梦中改变现实"),
    ("苏瑶", "心理咨询师，冷静敏锐，帮助林宇理解梦境"),
    ("老周", "灯塔看守人，知道小镇梦境的秘密"),
    ("阿青", "林宇的童年好友，在梦里失去了踪迹"),
    ("小满", "镇上书店的女孩，总在梦里留下线索"),
];

const OUTLINE: &[&str] = &[
    "林宇在梦中第一次改变了现实",
    "苏瑶察觉到林宇身上的异常",
    "老周讲出灯塔与梦境的往事",
    "梦境开始失控吞噬小镇",
    "林宇放下能力守护了小镇",
];

static CHARACTER_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"请生成(\d+)个主要角色").expect("Invalid character count regex"));
static SECTION_COUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"分为(\d+)个主要部分").expect("Invalid section count regex"));
static CURRENT_SUMMARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"当前段落大纲：\s*([^\n]+)").expect("Invalid current summary regex"));
static REWRITE_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"需要修正的段落：\n([\s\S]*?)\n\n修正要求").expect("Invalid rewrite target regex")
});

/// Fake LLM Client
pub struct FakeLlmClient {
    calls: AtomicUsize,
}

impl FakeLlmClient {
    pub fn new() -> Self {
        tracing::info!("FakeLlmClient initialized");
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    /// 已处理的调用次数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FakeLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

fn captured_count(re: &Regex, prompt: &str, default: usize) -> usize {
    re.captures(prompt)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(default)
}

fn characters(prompt: &str) -> String {
    let count = captured_count(&CHARACTER_COUNT, prompt, CHARACTERS.len());
    CHARACTERS
        .iter()
        .cycle()
        .take(count.max(1))
        .enumerate()
        .map(|(i, (name, description))| format!("{}. **{}**：{}", i + 1, name, description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn outline(prompt: &str) -> String {
    let sections = captured_count(&SECTION_COUNT, prompt, OUTLINE.len());
    (0..sections.max(1))
        .map(|i| {
            let summary = OUTLINE[i % OUTLINE.len()];
            if i < OUTLINE.len() {
                format!("{}. {}", i + 1, summary)
            } else {
                format!("{}. {}（第{}轮）", i + 1, summary, i / OUTLINE.len() + 1)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn section(prompt: &str) -> String {
    let summary = CURRENT_SUMMARY
        .captures(prompt)
        .and_then(|caps| caps.get(1))
        .map_or("故事继续", |m| m.as_str().trim());
    format!("**{}**。海风吹过小镇，   灯塔的光照亮了夜色。", summary)
}

fn critic(dimension: ScoreDimension) -> String {
    let score = match dimension {
        ScoreDimension::Coherence => 8.0,
        ScoreDimension::Quality => 7.5,
        ScoreDimension::Fluency => 8.5,
    };
    format!("评价完成。\n{}：{:.1}", dimension.label(), score)
}

fn rewrite(prompt: &str) -> Result<String, GenerationError> {
    REWRITE_TARGET
        .captures(prompt)
        .and_then(|caps| caps.get(1))
        .map(|m| format!("修正后的段落：{}", m.as_str()))
        .ok_or_else(|| GenerationError::InvalidResponse("rewrite prompt has no target".to_string()))
}

#[async_trait]
impl TextGenerationPort for FakeLlmClient {
    async fn generate_text(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = request.user_prompt.as_str();
        let kind = PromptKind::detect(prompt);

        tracing::debug!(kind = ?kind, prompt_len = prompt.len(), "FakeLlmClient: returning canned text");

        match kind {
            Some(PromptKind::Setting) => Ok(SETTING.to_string()),
            Some(PromptKind::Characters) => Ok(characters(prompt)),
            Some(PromptKind::Outline) => Ok(outline(prompt)),
            Some(PromptKind::Section) => Ok(section(prompt)),
            Some(PromptKind::Critic(dimension)) => Ok(critic(dimension)),
            Some(PromptKind::Rewrite) => rewrite(prompt),
            None => Err(GenerationError::InvalidResponse(
                "unrecognized prompt".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::prompts;
    use crate::domain::story::{ContextDigest, SectionContext};
    use crate::domain::text_structure::{extract_labeled_number, parse_numbered_items};

    #[tokio::test]
    async fn test_outline_follows_requested_count() {
        let client = FakeLlmClient::new();
        let text = client
            .generate_text(prompts::outline_prompt("DIGEST", 7))
            .await
            .unwrap();
        assert_eq!(parse_numbered_items(&text).len(), 7);
    }

    #[tokio::test]
    async fn test_critic_reply_is_parseable() {
        let client = FakeLlmClient::new();
        let ctx = SectionContext::build(0, &["开端".to_string()], None, &ContextDigest::from_raw("D"));

        for dimension in ScoreDimension::ALL {
            let text = client
                .generate_text(prompts::critic_prompt(&ctx, "正文", dimension))
                .await
                .unwrap();
            assert!(extract_labeled_number(&text, dimension.label()).is_some());
        }
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_rewrite_echoes_target() {
        let client = FakeLlmClient::new();
        let ctx = SectionContext::build(0, &["开端".to_string()], None, &ContextDigest::from_raw("D"));

        let text = client
            .generate_text(prompts::rewrite_prompt(&ctx, "林宇推开了门。"))
            .await
            .unwrap();
        assert_eq!(text, "修正后的段落：林宇推开了门。");
    }

    #[tokio::test]
    async fn test_unknown_prompt_is_rejected() {
        let client = FakeLlmClient::new();
        let result = client.generate_text(GenerationRequest::new("你好")).await;
        assert!(matches!(result, Err(GenerationError::InvalidResponse(_))));
    }
}
