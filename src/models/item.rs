use serde::{Deserialize, Serialize};

/// 待评分题目
///
/// 由一份提交和答案表中的一行组合而成，创建后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradableItem {
    /// 题目 ID（同一批次内唯一）
    pub id: String,
    /// 题目表头（即表单中的问题文本）
    pub header: String,
    /// 学生答案，可能为空
    pub answer: String,
    /// 评分标准（原样透传的 JSON 字符串）
    pub criteria: String,
}

impl GradableItem {
    pub fn new(
        id: impl Into<String>,
        header: impl Into<String>,
        answer: impl Into<String>,
        criteria: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            answer: answer.into(),
            criteria: criteria.into(),
        }
    }

    pub fn has_answer(&self) -> bool {
        !self.answer.is_empty()
    }
}
