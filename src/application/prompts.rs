//! 提示词模板
//!
//! 计划、起草、评审、修订四类调用的提示词都在这里构建。
//! 模板共享同一组写作要求，避免输出影响后续朗读的符号。

use std::fmt::Write;

use crate::application::ports::GenerationRequest;
use crate::domain::story::{ScoreDimension, SectionContext, SectionPosition};

const WRITER_SYSTEM: &str = "你是一位擅长创作中文故事的作家。";
const CRITIC_SYSTEM: &str = "你是一位专业的文学评论家，只按要求的格式输出评分。";
const EDITOR_SYSTEM: &str = "你是一位专业的文学编辑。";

/// 修订回复开头可能出现的引导标签，按优先级排列
pub const REWRITE_LEAD_LABELS: &[&str] = &[
    "修正后的段落：",
    "修正后的文本：",
    "修改后的段落：",
    "修改后：",
    "修正后：",
];

const PLAIN_TEXT_RULES: &str = "1. 用简体中文\n\
    2. 不要使用特殊字符、星号或markdown格式\n\
    3. 避免使用括号、方括号或任何可能影响文本转语音的符号\n";

const SECTION_RULES: &str = "要求：\n\
    1. 用简体中文写作\n\
    2. 不要使用特殊字符、星号或markdown格式\n\
    3. 避免使用括号、方括号或任何可能影响文本转语音的符号\n\
    4. 遵循大纲之间的联系及明暗线\n\
    5. 保持故事的连贯性\n\
    6. 故事有其特殊的风格和特点\n";

/// 提示词类别（根据模板中的固定文字识别）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Setting,
    Characters,
    Outline,
    Section,
    Critic(ScoreDimension),
    Rewrite,
}

impl PromptKind {
    /// 识别一段提示词属于哪个模板
    pub fn detect(user_prompt: &str) -> Option<Self> {
        if let Some(dimension) = ScoreDimension::ALL
            .into_iter()
            .find(|d| user_prompt.contains(&format!("{}评分标准", d.label())))
        {
            return Some(Self::Critic(dimension));
        }
        if user_prompt.contains("需要修正的段落") {
            return Some(Self::Rewrite);
        }
        if user_prompt.contains("全文如下") {
            return Some(Self::Section);
        }
        if user_prompt.contains("故事大纲") {
            return Some(Self::Outline);
        }
        if user_prompt.contains("个主要角色") {
            return Some(Self::Characters);
        }
        if user_prompt.contains("描述一下故事的背景") {
            return Some(Self::Setting);
        }
        None
    }
}

/// 背景提示词
pub fn setting_prompt(premise: &str) -> GenerationRequest {
    let prompt = format!(
        "故事的前提是：{}\n\n描述一下故事的背景\n\n要求：\n{}\
         4. 背景要有趣且富有想象力\n\
         5. 使用简单明了的语言\n\
         6. 对故事发展有指导意义\n\n这个故事发生在",
        premise, PLAIN_TEXT_RULES
    );
    GenerationRequest::new(prompt).with_system(WRITER_SYSTEM)
}

/// 角色提示词
pub fn characters_prompt(premise: &str, setting: &str, count: usize) -> GenerationRequest {
    let prompt = format!(
        "故事前提：{}\n\n故事背景：{}\n\n请生成{}个主要角色，要求：\n{}\
         4. 每个角色按照1. 2. 3.的格式列出，如 1. 角色名：特点、背景、对故事的影响\n\
         5. 每个角色需要有中文名字（不包含标点符号）和独特的特点背景\n",
        premise, setting, count, PLAIN_TEXT_RULES
    );
    GenerationRequest::new(prompt).with_system(WRITER_SYSTEM)
}

/// 大纲提示词
pub fn outline_prompt(context_digest: &str, sections: usize) -> GenerationRequest {
    let prompt = format!(
        "{}\n\n请生成一个完整的第三人称的故事大纲，分为{}个主要部分，要求：\n{}\
         4. 请确保内容适合所有年龄段，不包含任何不当或敏感的主题\n\
         5. 每个部分之间需要有伏笔响应且有逻辑关系并言简意赅\n\
         6. 每个部分单独一行，以序号开头，只写一句概括\n\
         输出示例：\n1. 大纲1\n2. 大纲2\n",
        context_digest, sections, PLAIN_TEXT_RULES
    );
    GenerationRequest::new(prompt).with_system(WRITER_SYSTEM)
}

/// 段落起草提示词，按段落位置选择模板
pub fn section_prompt(ctx: &SectionContext) -> GenerationRequest {
    let digest = ctx.context_digest.as_str();
    let previous_summary = ctx.previous_summary.as_deref().unwrap_or_default();
    let previous_text = ctx.previous_finalized_text.as_deref().unwrap_or_default();
    let next_summary = ctx.next_summary.as_deref().unwrap_or_default();

    let prompt = match ctx.position() {
        SectionPosition::Opening => {
            let next_line = ctx
                .next_summary
                .as_deref()
                .map(|next| format!("下一段落大纲：{}\n", next))
                .unwrap_or_default();
            format!(
                "背景信息：{}\n当前段落大纲：{}\n{}\n{}开头段落的全文如下\n",
                digest, ctx.current_summary, next_line, SECTION_RULES
            )
        }
        SectionPosition::Middle => format!(
            "背景信息：{}\n前一段落大纲：{}\n前一段落内容：{}\n下一段落大纲：{}\n当前段落大纲：\n{}\n{}当前段落的全文如下\n",
            digest, previous_summary, previous_text, next_summary, ctx.current_summary, SECTION_RULES
        ),
        SectionPosition::Closing => format!(
            "背景信息：{}\n前一段落大纲：{}\n前一段落内容：{}\n当前段落大纲：\n{}\n{}故事结尾的全文如下\n",
            digest, previous_summary, previous_text, ctx.current_summary, SECTION_RULES
        ),
    };
    GenerationRequest::new(prompt).with_system(WRITER_SYSTEM)
}

/// 评审与修订共用的上下文块
fn write_section_context(buf: &mut String, ctx: &SectionContext) {
    let _ = write!(buf, "背景信息：\n{}\n\n", ctx.context_digest);

    if let Some(previous_summary) = &ctx.previous_summary {
        let _ = writeln!(buf, "前一段大纲：{}", previous_summary);
        let _ = write!(
            buf,
            "前一段内容：{}\n\n",
            ctx.previous_finalized_text.as_deref().unwrap_or_default()
        );
    }

    let _ = write!(buf, "当前段落大纲：{}\n\n", ctx.current_summary);

    if let Some(next_summary) = &ctx.next_summary {
        let _ = write!(buf, "下一段大纲：{}\n\n", next_summary);
    }
}

/// 各维度的评分档位说明
fn rubric(dimension: ScoreDimension) -> [&'static str; 5] {
    match dimension {
        ScoreDimension::Coherence => [
            "段落内部逻辑完美，与前后文衔接自然，情节发展顺畅，伏笔和呼应恰到好处",
            "段落内部逻辑清晰，与前后文衔接良好，情节发展基本顺畅",
            "段落内部逻辑基本清晰，与前后文有一定衔接，情节发展有些跳跃",
            "段落内部逻辑不够清晰，与前后文衔接不够紧密，缺乏伏笔和呼应",
            "段落内部逻辑混乱，与前后文衔接生硬，情节发展断裂",
        ],
        ScoreDimension::Quality => [
            "内容丰富深刻，主题表达清晰有力，人物形象鲜明，细节描写生动",
            "内容较为丰富，主题表达清晰，情节设计合理，细节描写较好",
            "内容基本充实，主题表达基本清晰，人物形象和细节描写一般",
            "内容较为单薄，情节设计平淡，人物形象模糊，细节描写不足",
            "内容空洞，主题表达混乱，人物形象扁平，几乎没有细节描写",
        ],
        ScoreDimension::Fluency => [
            "语言优美流畅，句式多样灵活，用词精准丰富，节奏感强",
            "语言流畅，句式较为多样，用词准确，节奏感较好",
            "语言基本流畅，句式变化一般，用词基本准确",
            "语言不够流畅，句式单一，用词不够准确，节奏感差",
            "语言生硬，句式混乱，用词不当，缺乏节奏感",
        ],
    }
}

/// 单维度评审提示词
pub fn critic_prompt(
    ctx: &SectionContext,
    candidate: &str,
    dimension: ScoreDimension,
) -> GenerationRequest {
    let label = dimension.label();
    let mut buf = String::new();

    let _ = write!(
        buf,
        "请评估以下故事段落的{}，给出1.0-10.0分的评分（可以包含小数点后一位）。\n\n",
        label
    );
    write_section_context(&mut buf, ctx);
    let _ = write!(buf, "待评分段落：\n{}\n\n", candidate);

    let _ = writeln!(buf, "{}评分标准（1.0-10.0分）：", label);
    let bands = ["9.0-10.0", "7.0-8.9", "5.0-6.9", "3.0-4.9", "1.0-2.9"];
    for (band, description) in bands.iter().zip(rubric(dimension)) {
        let _ = writeln!(buf, "- {}分：{}", band, description);
    }

    let _ = write!(
        buf,
        "\n请仔细分析后给出评分，只输出一个数字作为评分结果，格式如下：\n{}：X.X\n",
        label
    );
    GenerationRequest::new(buf).with_system(CRITIC_SYSTEM)
}

/// 一致性修订提示词
pub fn rewrite_prompt(ctx: &SectionContext, candidate: &str) -> GenerationRequest {
    let mut buf = String::from("请检查并修正以下故事段落中可能存在的事实一致性错误。\n\n");

    write_section_context(&mut buf, ctx);
    let _ = write!(buf, "需要修正的段落：\n{}\n\n", candidate);

    buf.push_str("修正要求：\n");
    buf.push_str("1. 检查并修正段落中与背景信息或前文内容不一致的地方\n");
    buf.push_str("2. 确保人物名称、地点、事件等细节前后一致\n");
    buf.push_str("3. 修正逻辑矛盾或时间线错误\n");
    buf.push_str("4. 保持原文的风格和语气\n");
    buf.push_str("5. 不要添加新的情节，只修正事实一致性问题\n");
    buf.push_str("6. 如果没有发现问题，请直接返回原文\n\n");
    buf.push_str("请直接返回修正后的完整段落，不要包含解释或说明。\n");

    GenerationRequest::new(buf).with_system(EDITOR_SYSTEM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::story::ContextDigest;

    fn outline() -> Vec<String> {
        vec!["开端".into(), "发展".into(), "结局".into()]
    }

    #[test]
    fn test_section_templates_by_position() {
        let digest = ContextDigest::from_raw("DIGEST");
        let outline = outline();

        let opening = section_prompt(&SectionContext::build(0, &outline, None, &digest));
        assert!(opening.user_prompt.contains("开头段落"));
        assert!(!opening.user_prompt.contains("前一段落内容"));

        let middle = section_prompt(&SectionContext::build(1, &outline, Some("上一段正文"), &digest));
        assert!(middle.user_prompt.contains("前一段落内容：上一段正文"));
        assert!(middle.user_prompt.contains("下一段落大纲：结局"));

        let closing = section_prompt(&SectionContext::build(2, &outline, Some("中段正文"), &digest));
        assert!(closing.user_prompt.contains("故事结尾"));
        assert!(!closing.user_prompt.contains("下一段落大纲"));
    }

    #[test]
    fn test_single_section_opening_has_no_next_summary_line() {
        let digest = ContextDigest::from_raw("DIGEST");
        let single = vec!["唯一的段落".to_string()];

        let opening = section_prompt(&SectionContext::build(0, &single, None, &digest));
        assert!(opening.user_prompt.contains("当前段落大纲：唯一的段落\n"));
        assert!(!opening.user_prompt.contains("下一段落大纲"));

        let with_next = section_prompt(&SectionContext::build(0, &outline(), None, &digest));
        assert!(with_next.user_prompt.contains("下一段落大纲：发展\n"));
    }

    #[test]
    fn test_prompt_kind_detection() {
        let digest = ContextDigest::from_raw("DIGEST");
        let ctx = SectionContext::build(1, &outline(), Some("上一段"), &digest);

        assert_eq!(PromptKind::detect(&setting_prompt("前提").user_prompt), Some(PromptKind::Setting));
        assert_eq!(
            PromptKind::detect(&characters_prompt("前提", "背景", 3).user_prompt),
            Some(PromptKind::Characters)
        );
        assert_eq!(PromptKind::detect(&outline_prompt("DIGEST", 5).user_prompt), Some(PromptKind::Outline));
        assert_eq!(PromptKind::detect(&section_prompt(&ctx).user_prompt), Some(PromptKind::Section));
        assert_eq!(PromptKind::detect(&rewrite_prompt(&ctx, "正文").user_prompt), Some(PromptKind::Rewrite));
        for dimension in ScoreDimension::ALL {
            assert_eq!(
                PromptKind::detect(&critic_prompt(&ctx, "正文", dimension).user_prompt),
                Some(PromptKind::Critic(dimension))
            );
        }
    }

    #[test]
    fn test_critic_prompt_requests_labeled_score() {
        let digest = ContextDigest::from_raw("DIGEST");
        let ctx = SectionContext::build(0, &outline(), None, &digest);
        let request = critic_prompt(&ctx, "候选正文", ScoreDimension::Quality);

        assert!(request.user_prompt.ends_with("内容质量：X.X\n"));
        assert!(request.user_prompt.contains("待评分段落：\n候选正文"));
        assert!(request.system_instruction.is_some());
    }
}
