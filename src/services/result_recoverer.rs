//! 模型输出解析 - 业务能力层
//!
//! 把模型返回的半结构化文本还原成逐题结果，按以下顺序逐层尝试：
//!
//! 1. 整体结构解析：数组 / 带 `results` 的对象 / 单个结果对象
//! 2. 逐个对象扫描：以 `{"question_id": "..."` 为起点做括号配对
//! 3. 字段兜底：配对出的片段不是合法 JSON 时，用正则逐字段提取
//!
//! 解析永远不会失败，最坏情况返回空列表。

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::models::QuestionResult;

pub const FALLBACK_FEEDBACK: &str = "Extracted via regex fallback.";
pub const FALLBACK_IMPROVEMENT: &str = "N/A";

/// 整体结构解析的结果
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedShape {
    /// 文本本身是一个数组
    Array(Vec<Value>),
    /// 对象中的 `results` 数组
    ResultsField(Vec<Value>),
    /// 对象本身就是单个结果
    SingleResult(Value),
}

impl ParsedShape {
    pub fn into_values(self) -> Vec<Value> {
        match self {
            ParsedShape::Array(values) | ParsedShape::ResultsField(values) => values,
            ParsedShape::SingleResult(value) => vec![value],
        }
    }
}

/// 解析模型输出，返回可匹配的逐题结果
///
/// `expected_count` 只用于日志，返回数量可能多于或少于它，也可能有重复 ID。
pub fn recover_results(text: &str, expected_count: usize) -> Vec<QuestionResult> {
    let values = recover_values(text);
    let results: Vec<QuestionResult> = values.iter().filter_map(QuestionResult::from_value).collect();

    if results.len() != expected_count {
        debug!(
            "解析到 {} 个结果，期望 {} 个（原始对象 {} 个）",
            results.len(),
            expected_count,
            values.len()
        );
    }

    results
}

/// 解析模型输出，返回原始 JSON 对象列表
pub fn recover_values(text: &str) -> Vec<Value> {
    if text.is_empty() {
        return Vec::new();
    }
    debug!("待解析文本长度: {}", text.len());

    if let Some(shape) = sniff_structure(text) {
        return shape.into_values();
    }

    debug!("整体解析失败，尝试逐个对象提取...");
    let values = scan_objects(text);
    info!("逐个对象提取完成，找到 {} 道题目", values.len());
    values
}

/// 第一层：整体结构解析
///
/// 第一个 `[` 出现在任何 `{` 之前时按数组解析（失败则直接放弃本层）；
/// 否则按对象解析，依次识别 `results` 数组和带 `question_id` 的单个结果。
pub fn sniff_structure(text: &str) -> Option<ParsedShape> {
    let first_bracket = text.find('[');
    let last_bracket = text.rfind(']');
    let first_brace = text.find('{');
    let last_brace = text.rfind('}');

    if let Some(open) = first_bracket {
        if first_brace.map_or(true, |brace| open < brace) {
            let parsed: Value = serde_json::from_str(span(text, open, last_bracket)?).ok()?;
            return match parsed {
                Value::Array(values) => Some(ParsedShape::Array(values)),
                _ => None,
            };
        }
    }

    let open = first_brace?;
    let parsed: Value = serde_json::from_str(span(text, open, last_brace)?).ok()?;

    if let Some(Value::Array(results)) = parsed.get("results") {
        return Some(ParsedShape::ResultsField(results.clone()));
    }
    if parsed.get("question_id").is_some_and(is_truthy) {
        return Some(ParsedShape::SingleResult(parsed));
    }
    None
}

fn span(text: &str, open: usize, close: Option<usize>) -> Option<&str> {
    let close = close.filter(|&c| c >= open)?;
    Some(&text[open..=close])
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 第二、三层：逐个对象提取，解析失败时按字段兜底
pub fn scan_objects(text: &str) -> Vec<Value> {
    let mut values = Vec::new();

    for caps in question_id_opener().captures_iter(text) {
        let (Some(whole), Some(question_id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let start = whole.start();
        // 括号未闭合（输出被截断）的片段直接丢弃
        let Some(end) = find_matching_brace(text, start) else {
            continue;
        };

        let candidate = &text[start..=end];
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => values.push(value),
            Err(e) => {
                debug!("片段解析失败 ({}), 使用字段兜底: {}", question_id.as_str(), e);
                values.push(salvage_fields(question_id.as_str(), candidate));
            }
        }
    }

    values
}

/// 从 `start` 处的 `{` 开始做括号计数，返回与之配对的 `}` 的位置
///
/// 不识别字符串字面量，字符串里的括号也会参与计数。
pub fn find_matching_brace(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'{') {
        return None;
    }

    let mut depth: usize = 0;
    for (offset, &byte) in bytes[start..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// 第三层：用正则从残缺片段中逐字段提取
pub fn salvage_fields(question_id: &str, candidate: &str) -> Value {
    let total_score = total_score_regex()
        .captures(candidate)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0);

    let feedback = quoted_field(feedback_regex(), candidate).unwrap_or(FALLBACK_FEEDBACK);
    let improvement = quoted_field(improvement_regex(), candidate).unwrap_or(FALLBACK_IMPROVEMENT);

    json!({
        "question_id": question_id,
        "total_score": total_score,
        "feedback": feedback,
        "improvement": improvement,
        "criteria_results": [],
    })
}

fn quoted_field<'a>(re: &Regex, candidate: &'a str) -> Option<&'a str> {
    re.captures(candidate).and_then(|c| c.get(1)).map(|m| m.as_str())
}

fn question_id_opener() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\{\s*"question_id"\s*:\s*"([^"]+)""#).expect("valid regex"))
}

fn total_score_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""total_score"\s*:\s*(\d+(\.\d+)?)"#).expect("valid regex"))
}

fn feedback_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""feedback"\s*:\s*"([^"]+)""#).expect("valid regex"))
}

fn improvement_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""improvement"\s*:\s*"([^"]+)""#).expect("valid regex"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q1: &str = r#"{"question_id":"Q1","total_score":5,"feedback":"Clear","improvement":"More detail","criteria_results":[{"id":"c1","awarded":5,"reason":"ok"}]}"#;
    const Q2: &str = r#"{"question_id":"Q2","total_score":3,"feedback":"Partial","improvement":"Name examples","criteria_results":[]}"#;

    #[test]
    fn test_results_wrapper() {
        let text = format!(r#"{{"results":[{}]}}"#, Q1);
        let results = recover_results(&text, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].question_id, "Q1");
        assert_eq!(results[0].total_score, 5.0);
        assert_eq!(results[0].criteria_results.len(), 1);
    }

    #[test]
    fn test_sniff_bare_array_with_prose() {
        let text = format!("Here are the grades:\n[{}, {}]\nThanks!", Q1, Q2);
        match sniff_structure(&text) {
            Some(ParsedShape::Array(values)) => assert_eq!(values.len(), 2),
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn test_sniff_single_result_object() {
        let text = format!("```json\n{}\n```", Q2);
        match sniff_structure(&text) {
            Some(ParsedShape::SingleResult(value)) => assert_eq!(value["question_id"], "Q2"),
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn test_sniff_object_without_known_fields_yields_nothing() {
        assert_eq!(sniff_structure(r#"{"grades": []}"#), None);
        assert_eq!(sniff_structure(r#"{"question_id": ""}"#), None);
    }

    #[test]
    fn test_empty_results_array_is_authoritative() {
        let text = format!(r#"{{"results":[]}} trailing {}"#, "noise");
        assert!(recover_values(&text).is_empty());
    }

    #[test]
    fn test_truncated_wrapper_recovers_objects_by_brace_matching() {
        // 外层数组和对象都没有闭合
        let text = format!(r#"{{"results":[{},{}"#, Q1, Q2);
        assert_eq!(sniff_structure(&text), None);

        let results = recover_results(&text, 2);
        let ids: Vec<&str> = results.iter().map(|r| r.question_id.as_str()).collect();
        assert_eq!(ids, vec!["Q1", "Q2"]);
        assert_eq!(results[1].feedback, "Partial");
    }

    #[test]
    fn test_truncated_array_recovers_objects() {
        let text = format!("[{}, {}", Q1, Q2);
        let results = recover_results(&text, 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_field_salvage_for_invalid_fragment() {
        let text = r#"{"question_id":"Q3", "total_score": 7.5, "criteria_results": [oops]}"#;
        let values = recover_values(text);
        assert_eq!(values.len(), 1);
        assert_eq!(
            values[0],
            json!({
                "question_id": "Q3",
                "total_score": 7.5,
                "feedback": "Extracted via regex fallback.",
                "improvement": "N/A",
                "criteria_results": []
            })
        );
    }

    #[test]
    fn test_field_salvage_keeps_present_fields() {
        let candidate = r#"{"question_id":"Q4","total_score":2,"feedback":"Short","improvement":"Expand",}"#;
        let value = salvage_fields("Q4", candidate);
        assert_eq!(value["total_score"], 2.0);
        assert_eq!(value["feedback"], "Short");
        assert_eq!(value["improvement"], "Expand");
    }

    #[test]
    fn test_unterminated_object_is_skipped() {
        let text = format!(r#"{{"question_id":"Q9","total_score":1 noise {}"#, Q1);
        assert_eq!(sniff_structure(&text), None);

        let results = recover_results(&text, 2);
        let ids: Vec<&str> = results.iter().map(|r| r.question_id.as_str()).collect();
        assert_eq!(ids, vec!["Q1"]);
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let dup = Q1.replace("\"total_score\":5", "\"total_score\":1");
        let text = format!("{} {} {}", Q1, "garbage ] [", dup);
        let results = recover_results(&text, 1);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].total_score, 5.0);
        assert_eq!(results[1].total_score, 1.0);
    }

    #[test]
    fn test_unrecognizable_text_is_empty() {
        assert!(recover_results("", 3).is_empty());
        assert!(recover_results("I cannot grade these answers.", 3).is_empty());
        assert!(recover_results("score: 5/10 } {", 1).is_empty());
    }

    #[test]
    fn test_find_matching_brace() {
        let text = r#"x{"a":{"b":1},"c":2}y"#;
        assert_eq!(find_matching_brace(text, 1), Some(text.len() - 2));
        assert_eq!(find_matching_brace(text, 0), None);
        assert_eq!(find_matching_brace("{{}", 0), None);
    }

    #[test]
    fn test_find_matching_brace_ignores_string_literals() {
        // 字符串中的括号也参与计数
        let text = r#"{"feedback":"use } carefully"}"#;
        assert_eq!(find_matching_brace(text, 0), Some(text.find('}').unwrap()));
    }
}
