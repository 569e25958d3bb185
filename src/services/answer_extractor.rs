//! 答案提取 - 业务能力层
//!
//! 把一次表单提交按答案表拆成待评分题目，并解析学生身份。

use std::collections::HashMap;

use tracing::debug;

use crate::models::{AnswerKey, ExamConfig, GradableItem, Submission};

const DEFAULT_STUDENT_NAME: &str = "Student";

/// 表头规范化：合并连续空白、去掉首尾空白、转小写
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 学生身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentIdentity {
    /// 可能为空，为空时不发送通知
    pub email: String,
    pub name: String,
}

/// 解析学生邮箱和姓名
pub fn student_identity(exam: &ExamConfig, submission: &Submission) -> StudentIdentity {
    let email = lookup_normalized(submission, exam.email_column_header())
        .unwrap_or_default()
        .trim()
        .to_string();

    let configured_name = exam
        .name_column_header()
        .and_then(|header| lookup_normalized(submission, header));

    let name = configured_name
        .or_else(|| {
            submission
                .named_values
                .iter()
                .find(|nv| nv.header.to_lowercase().contains("name"))
                .and_then(|nv| nv.values.first())
                .map(String::as_str)
        })
        .unwrap_or(DEFAULT_STUDENT_NAME)
        .to_string();

    StudentIdentity { email, name }
}

/// 按规范化表头查找提交值：先查按表头提交的值，再查表头行对应的位置
fn lookup_normalized<'a>(submission: &'a Submission, header: &str) -> Option<&'a str> {
    let wanted = normalize_header(header);

    let named = submission
        .named_values
        .iter()
        .find(|nv| normalize_header(&nv.header) == wanted)
        .and_then(|nv| nv.values.first())
        .map(String::as_str);

    named.or_else(|| {
        submission
            .headers
            .iter()
            .position(|h| normalize_header(h) == wanted)
            .and_then(|idx| submission.values.get(idx))
            .map(String::as_str)
    })
}

/// 根据答案表生成待评分题目
///
/// 缺少表头或评分标准的行会被跳过；缺少题目 ID 时按行号生成 `Q<n>`。
pub fn extract_items(answer_key: &AnswerKey, submission: &Submission) -> Vec<GradableItem> {
    // 同名表头以最后一列为准
    let header_index: HashMap<String, usize> = submission
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| (normalize_header(h), i))
        .collect();

    let mut items = Vec::new();

    for (row_index, row) in answer_key.rows.iter().enumerate() {
        let header = match row.question_header.as_deref().filter(|h| !h.is_empty()) {
            Some(h) => h,
            None => continue,
        };
        let criteria = match row.criteria_json.as_deref().filter(|c| !c.is_empty()) {
            Some(c) => c,
            None => continue,
        };

        let id = row
            .question_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Q{}", row_index + 1));

        let answer = match header_index.get(&normalize_header(header)) {
            Some(&idx) => submission.values.get(idx).map(String::as_str).unwrap_or(""),
            None => submission.named_value(header).unwrap_or(""),
        };

        items.push(GradableItem::new(id, header, answer.trim(), criteria));
    }

    debug!("从答案表中提取到 {} 道题目", items.len());
    items
}
