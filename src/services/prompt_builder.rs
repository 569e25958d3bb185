//! 批量评分提示词

use crate::models::GradableItem;

const NO_ANSWER_MARKER: &str = "[No answer provided]";

const GRADING_RULES: &str = r#"Rules:
1. Grade EACH question strictly according to its unique criteria.
2. Award full marks for a criterion ONLY if clearly mentioned.
3. If partially mentioned, award half marks. If not mentioned, award 0.
4. Use local context where relevant.
5. Be concise."#;

const OUTPUT_SCHEMA: &str = r#"Return ONLY a valid JSON object with a "results" array containing one entry for each question:
{
  "results": [
    {
      "question_id": "Q1",
      "total_score": 16,
      "feedback": "...",
      "improvement": "...",
      "criteria_results": [{"id": "website_type", "awarded": 4, "reason": "..."}]
    },
    ...
  ]
}"#;

/// 构建一个分块的批量评分提示词
///
/// 按输入顺序列出每道题目，不截断也不重排。
pub fn build_batch_grading_prompt(exam_name: &str, items: &[GradableItem]) -> String {
    let questions_block = items
        .iter()
        .map(|item| {
            let answer = if item.has_answer() {
                item.answer.as_str()
            } else {
                NO_ANSWER_MARKER
            };
            format!(
                "--- QUESTION {} ---\nHeader: {}\nStudent Answer: {}\nCriteria (JSON): {}",
                item.id, item.header, answer, item.criteria
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are an expert exam grader for the exam: \"{}\".\nGrade the following {} questions.\n\n{}\n\n{}\n\n{}\n",
        exam_name,
        items.len(),
        questions_block,
        GRADING_RULES,
        OUTPUT_SCHEMA
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_item_in_order() {
        let items = vec![
            GradableItem::new("Q2", "Name a browser", "Firefox", r#"{"max":2}"#),
            GradableItem::new("Q1", "What is HTML?", "", r#"{"max":4}"#),
        ];

        let prompt = build_batch_grading_prompt("Web Basics", &items);

        assert!(prompt.contains("exam: \"Web Basics\""));
        assert!(prompt.contains("Grade the following 2 questions."));
        let q2 = prompt.find("--- QUESTION Q2 ---").unwrap();
        let q1 = prompt.find("--- QUESTION Q1 ---").unwrap();
        assert!(q2 < q1);
        assert!(prompt.contains("Student Answer: Firefox"));
        assert!(prompt.contains("Student Answer: [No answer provided]"));
        assert!(prompt.contains(r#"Criteria (JSON): {"max":4}"#));
    }

    #[test]
    fn test_prompt_describes_output_schema() {
        let items = vec![GradableItem::new("Q1", "H", "A", "{}")];
        let prompt = build_batch_grading_prompt("Exam", &items);

        for field in [
            "\"results\"",
            "\"question_id\"",
            "\"total_score\"",
            "\"feedback\"",
            "\"improvement\"",
            "\"criteria_results\"",
        ] {
            assert!(prompt.contains(field), "missing {}", field);
        }
        assert!(prompt.contains("award half marks"));
    }
}
