//! 文本结构解析器
//!
//! 模型返回的是自由文本，这里把需要识别的“形状”声明为独立的规则：
//! - 强调标记（`**粗体**`、`*斜体*`、孤立的 `*`）
//! - 已知的引导标签（如 "修正后的段落："）
//! - 序号列表（`1.`、`第一部分：`、`Part 2:`）
//! - 带标签的数值（如 "连贯性：7.5"）
//!
//! 所有函数都是纯函数，不做任何 I/O。

use once_cell::sync::Lazy;
use regex::Regex;

/// 序号列表中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedItem {
    /// 序号标记之后、行尾之前的文本
    pub header: String,
    /// 该项之后、下一个标题之前的非空行（以换行拼接）
    pub body: String,
}

/// 一条序号标记规则：匹配器 + 提取器
///
/// `pattern` 必须包含名为 `rest` 的捕获组，即标记之后的正文。
struct OrdinalRule {
    name: &'static str,
    pattern: Regex,
}

/// 序号标记规则，按优先级排列
static ORDINAL_RULES: Lazy<Vec<OrdinalRule>> = Lazy::new(|| {
    vec![
        OrdinalRule {
            name: "decimal",
            pattern: Regex::new(r"^\d+[.．]\s*(?P<rest>.*)$").expect("Invalid decimal ordinal regex"),
        },
        OrdinalRule {
            name: "zh_part",
            pattern: Regex::new(r"^[（(]?第[一二三四五六七八九十百\d]+部分[：:]\s*(?P<rest>.*)$")
                .expect("Invalid zh part ordinal regex"),
        },
        OrdinalRule {
            name: "en_part",
            pattern: Regex::new(r"(?i)^\(?part\s+(?:\d+|[ivx]+)\s*[:：]\s*(?P<rest>.*)$")
                .expect("Invalid en part ordinal regex"),
        },
    ]
});

/// 成对的强调标记（保留内部文字）
static EMPHASIS_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*+([^*\n]*?)\*+").expect("Invalid emphasis span regex"));

/// 段落开头的序号
static DECIMAL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.．]\s*").expect("Invalid decimal prefix regex"));

/// 单行文本开头的 "xx大纲：" 前缀
static OUTLINE_LABEL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*?大纲[：: ]").expect("Invalid outline prefix regex"));

/// 去除强调标记
///
/// 成对的 `*`/`**` 包裹区间只删除标记、保留内部文字，之后再删除剩余的孤立 `*`。
pub fn strip_emphasis_runs(text: &str) -> String {
    let unwrapped = EMPHASIS_SPAN.replace_all(text, "$1");
    unwrapped.replace('*', "")
}

/// 去除开头的已知标签
///
/// 按 `labels` 的顺序检查，第一个匹配的标签被移除；都不匹配时原样返回。
pub fn strip_leading_label<'a>(text: &'a str, labels: &[&str]) -> &'a str {
    labels
        .iter()
        .find_map(|label| text.strip_prefix(label))
        .unwrap_or(text)
}

/// 去除段落开头的序号或大纲标签
///
/// 大纲标签只在单行文本上识别，多行正文里出现的 "大纲" 不做处理。
/// 只有在去除后仍有内容时才会生效。
pub fn strip_ordinal_prefix(text: &str) -> &str {
    let prefix = DECIMAL_PREFIX.find(text).or_else(|| {
        if text.contains('\n') {
            None
        } else {
            OUTLINE_LABEL_PREFIX.find(text)
        }
    });
    match prefix {
        Some(m) if !text[m.end()..].trim().is_empty() => &text[m.end()..],
        _ => text,
    }
}

/// 合并连续空白为单个空格，并去除首尾空白
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 按字符数截断（不会切断多字节字符）
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 尝试把一行解析为列表标题，返回标题文本
fn match_header(line: &str) -> Option<String> {
    ORDINAL_RULES.iter().find_map(|rule| {
        rule.pattern.captures(line).map(|caps| {
            let rest = caps.name("rest").map_or("", |m| m.as_str());
            tracing::trace!(rule = rule.name, line = %line, "Matched ordinal header");
            clean_header(rest)
        })
    })
}

/// 去除标题两端包裹的括号和空白
fn clean_header(rest: &str) -> String {
    rest.trim()
        .trim_start_matches(['(', '（'])
        .trim_end_matches([')', '）'])
        .trim()
        .to_string()
}

/// 判断一行是否为列表标题
pub fn is_numbered_header(line: &str) -> bool {
    match_header(line.trim()).is_some()
}

/// 判断文本的第一个非空行是否为列表标题
pub fn starts_with_numbered_header(text: &str) -> bool {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .is_some_and(is_numbered_header)
}

/// 解析序号列表
///
/// 规则：
/// 1. 以序号标记开头的行是标题，标题文本为标记之后的内容
/// 2. 标题之后、下一个标题之前的非空行追加到该项正文
/// 3. 第一个标题之前的内容被忽略
pub fn parse_numbered_items(text: &str) -> Vec<NumberedItem> {
    let mut items: Vec<NumberedItem> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }

        if let Some(header) = match_header(line) {
            items.push(NumberedItem {
                header,
                body: String::new(),
            });
        } else if let Some(current) = items.last_mut() {
            if !current.body.is_empty() {
                current.body.push('\n');
            }
            current.body.push_str(line);
        }
    }

    items
}

/// 把标题列表渲染为 `1. xxx` 形式的文本
pub fn render_numbered_list(headers: &[String]) -> String {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| format!("{}. {}", i + 1, header))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 提取标签之后的第一个数字
///
/// 匹配 `label：` 或 `label:` 之后紧跟的整数或小数，中间不允许有空白。
pub fn extract_labeled_number(text: &str, label: &str) -> Option<f64> {
    let pattern = format!(r"{}[：:](\d+(?:\.\d+)?)", regex::escape(label));
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_emphasis_keeps_inner_text() {
        assert_eq!(strip_emphasis_runs("**Alice**: brave"), "Alice: brave");
        assert_eq!(strip_emphasis_runs("她*轻声*说"), "她轻声说");
    }

    #[test]
    fn test_strip_emphasis_removes_bare_markers() {
        assert_eq!(strip_emphasis_runs("林宇** 走进了* 梦"), "林宇 走进了 梦");
        assert_eq!(strip_emphasis_runs("没有标记"), "没有标记");
    }

    #[test]
    fn test_strip_leading_label_priority() {
        let labels = ["修正后的段落：", "修正后："];
        assert_eq!(strip_leading_label("修正后的段落：正文", &labels), "正文");
        assert_eq!(strip_leading_label("修正后：正文", &labels), "正文");
        assert_eq!(strip_leading_label("正文", &labels), "正文");
    }

    #[test]
    fn test_strip_ordinal_prefix() {
        assert_eq!(strip_ordinal_prefix("1. 林宇醒来"), "林宇醒来");
        assert_eq!(strip_ordinal_prefix("第一段大纲：林宇醒来"), "林宇醒来");
        // 去掉后为空时不处理
        assert_eq!(strip_ordinal_prefix("1. "), "1. ");
        assert_eq!(strip_ordinal_prefix("林宇醒来"), "林宇醒来");
    }

    #[test]
    fn test_outline_label_ignored_in_multiline_prose() {
        let prose = "林宇翻开那份大纲 看了很久。\n窗外下着雨。";
        assert_eq!(strip_ordinal_prefix(prose), prose);
        assert_eq!(strip_ordinal_prefix("林宇翻开那份大纲 看了很久。"), "看了很久。");
        assert_eq!(strip_ordinal_prefix("2. 林宇醒来\n窗外下着雨。"), "林宇醒来\n窗外下着雨。");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\n b\t c  "), "a b c");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("森林深处的小屋", 4), "森林深处");
        assert_eq!(truncate_chars("短", 10), "短");
    }

    #[test]
    fn test_parse_numbered_items_with_bodies() {
        let text = "以下是角色：\n1. 林宇：程序员\n内向但富有创造力\n\n2. 苏瑶：心理咨询师\n3. 老周";
        let items = parse_numbered_items(text);

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].header, "林宇：程序员");
        assert_eq!(items[0].body, "内向但富有创造力");
        assert_eq!(items[1].header, "苏瑶：心理咨询师");
        assert!(items[1].body.is_empty());
        assert_eq!(items[2].header, "老周");
    }

    #[test]
    fn test_parse_localized_part_headers() {
        let text = "第一部分：相遇\n第2部分:冒险\n（第三部分：归来）\nPart 4: Epilogue";
        let headers: Vec<String> = parse_numbered_items(text)
            .into_iter()
            .map(|item| item.header)
            .collect();

        assert_eq!(headers, vec!["相遇", "冒险", "归来", "Epilogue"]);
    }

    #[test]
    fn test_parse_is_idempotent_on_headers() {
        let text = "1. 开端\n细节不保留\n2. 发展\n3. 高潮";
        let headers: Vec<String> = parse_numbered_items(text)
            .into_iter()
            .map(|item| item.header)
            .collect();

        let reparsed: Vec<String> = parse_numbered_items(&render_numbered_list(&headers))
            .into_iter()
            .map(|item| item.header)
            .collect();

        assert_eq!(headers, reparsed);
    }

    #[test]
    fn test_starts_with_numbered_header() {
        assert!(starts_with_numbered_header("\n1. 林宇：程序员"));
        assert!(!starts_with_numbered_header("好的，以下是角色\n1. 林宇"));
        assert!(!starts_with_numbered_header(""));
    }

    #[test]
    fn test_extract_labeled_number() {
        assert_eq!(extract_labeled_number("连贯性：7.5", "连贯性"), Some(7.5));
        assert_eq!(extract_labeled_number("评分\n内容质量:8", "内容质量"), Some(8.0));
        assert_eq!(extract_labeled_number("表达流畅度：6.0", "表达流畅度"), Some(6.0));
        assert_eq!(extract_labeled_number("表达流畅度： 6.0", "表达流畅度"), None);
        assert_eq!(extract_labeled_number("连贯性很好", "连贯性"), None);
        assert_eq!(extract_labeled_number("流畅度：9", "表达流畅度"), None);
    }
}
