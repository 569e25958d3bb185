//! 提交处理上下文
//!
//! 封装"我正在为哪场考试的哪位学生评分"这一信息

use std::fmt::Display;

/// 提交处理上下文
#[derive(Debug, Clone)]
pub struct SubmissionCtx {
    /// 回复表格 ID
    pub source_id: String,

    /// 考试名称
    pub exam_name: String,

    /// 学生邮箱（可能为空）
    pub student_email: String,

    /// 学生姓名
    pub student_name: String,
}

impl SubmissionCtx {
    /// 创建新的提交上下文
    pub fn new(
        source_id: String,
        exam_name: String,
        student_email: String,
        student_name: String,
    ) -> Self {
        Self {
            source_id,
            exam_name,
            student_email,
            student_name,
        }
    }

    pub fn has_email(&self) -> bool {
        !self.student_email.is_empty()
    }
}

impl Display for SubmissionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[考试 {} 来源#{} 学生#{}]",
            self.exam_name, self.source_id, self.student_name
        )
    }
}
