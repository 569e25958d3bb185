//! 评分结果模型

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::item::GradableItem;

/// 单个评分标准的得分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub id: String,
    pub awarded: f64,
    pub reason: String,
}

/// 单道题目的评分结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: String,
    pub total_score: f64,
    pub feedback: String,
    pub improvement: String,
    #[serde(default)]
    pub criteria_results: Vec<CriterionResult>,
}

impl QuestionResult {
    /// 从模型返回的 JSON 值宽松地构造结果
    ///
    /// `question_id` 必须是字符串，否则返回 `None`（无法与任何题目匹配）。
    /// 数值字段接受数字或数字字符串，其余缺失字段取空值。
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let question_id = obj.get("question_id")?.as_str()?.to_string();

        let criteria_results = obj
            .get("criteria_results")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(criterion_from_value).collect())
            .unwrap_or_default();

        Some(Self {
            question_id,
            total_score: obj.get("total_score").map(number_or_zero).unwrap_or(0.0),
            feedback: text_or_empty(obj.get("feedback")),
            improvement: text_or_empty(obj.get("improvement")),
            criteria_results,
        })
    }

    /// 为没有匹配结果的题目生成默认结果
    pub fn fallback_for(item: &GradableItem) -> Self {
        let (feedback, improvement) = if item.has_answer() {
            (
                "AI could not evaluate this response.",
                "Answer all required criteria clearly.",
            )
        } else {
            ("No answer was provided.", "Please answer the question.")
        };

        Self {
            question_id: item.id.clone(),
            total_score: 0.0,
            feedback: feedback.to_string(),
            improvement: improvement.to_string(),
            criteria_results: Vec::new(),
        }
    }
}

fn criterion_from_value(value: &Value) -> Option<CriterionResult> {
    let obj = value.as_object()?;
    let id = match obj.get("id")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Some(CriterionResult {
        id,
        awarded: obj.get("awarded").map(number_or_zero).unwrap_or(0.0),
        reason: text_or_empty(obj.get("reason")),
    })
}

fn number_or_zero(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn text_or_empty(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// 单道题目的最终评分
#[derive(Debug, Clone, PartialEq)]
pub struct GradedQuestion {
    pub item: GradableItem,
    pub result: QuestionResult,
    /// 结果是否为默认填充（模型未给出匹配结果）
    pub defaulted: bool,
}

/// 一次批量评分的完整结果
///
/// 每道输入题目恰好对应一条结果，顺序与输入一致。
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub graded: Vec<GradedQuestion>,
    /// 所有分块的原始模型输出（审计用）
    pub raw_output: String,
}

impl BatchOutcome {
    pub fn len(&self) -> usize {
        self.graded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graded.is_empty()
    }

    /// 按题目 ID 查找结果
    pub fn get(&self, question_id: &str) -> Option<&QuestionResult> {
        self.graded
            .iter()
            .find(|g| g.item.id == question_id)
            .map(|g| &g.result)
    }

    pub fn total_score(&self) -> f64 {
        self.graded.iter().map(|g| g.result.total_score).sum()
    }

    pub fn defaulted_count(&self) -> usize {
        self.graded.iter().filter(|g| g.defaulted).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_reads_full_result() {
        let value = json!({
            "question_id": "Q1",
            "total_score": 16,
            "feedback": "Good",
            "improvement": "Add examples",
            "criteria_results": [{"id": "website_type", "awarded": 4, "reason": "named it"}]
        });

        let result = QuestionResult::from_value(&value).unwrap();
        assert_eq!(result.question_id, "Q1");
        assert_eq!(result.total_score, 16.0);
        assert_eq!(result.criteria_results.len(), 1);
        assert_eq!(result.criteria_results[0].id, "website_type");
        assert_eq!(result.criteria_results[0].awarded, 4.0);
    }

    #[test]
    fn test_from_value_is_lenient_about_types() {
        let value = json!({
            "question_id": "Q2",
            "total_score": "7.5",
            "criteria_results": [{"id": 1, "awarded": "2"}, "junk"]
        });

        let result = QuestionResult::from_value(&value).unwrap();
        assert_eq!(result.total_score, 7.5);
        assert_eq!(result.feedback, "");
        assert_eq!(result.criteria_results.len(), 1);
        assert_eq!(result.criteria_results[0].id, "1");
        assert_eq!(result.criteria_results[0].awarded, 2.0);
    }

    #[test]
    fn test_from_value_rejects_non_string_id() {
        assert!(QuestionResult::from_value(&json!({"question_id": 3})).is_none());
        assert!(QuestionResult::from_value(&json!({"total_score": 3})).is_none());
        assert!(QuestionResult::from_value(&json!("Q1")).is_none());
    }

    #[test]
    fn test_fallback_depends_on_answer() {
        let answered = GradableItem::new("Q1", "Header", "some answer", "{}");
        let empty = GradableItem::new("Q2", "Header", "", "{}");

        let a = QuestionResult::fallback_for(&answered);
        assert_eq!(a.question_id, "Q1");
        assert_eq!(a.total_score, 0.0);
        assert_eq!(a.feedback, "AI could not evaluate this response.");
        assert_eq!(a.improvement, "Answer all required criteria clearly.");

        let e = QuestionResult::fallback_for(&empty);
        assert_eq!(e.feedback, "No answer was provided.");
        assert_eq!(e.improvement, "Please answer the question.");
        assert!(e.criteria_results.is_empty());
    }
}
