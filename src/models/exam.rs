use serde::{Deserialize, Serialize};

pub const DEFAULT_RESPONSE_SHEET: &str = "Form Responses 1";
pub const DEFAULT_EMAIL_HEADER: &str = "Email Address";

/// 考试配置（对应一个回复表格）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamConfig {
    #[serde(default)]
    pub response_spreadsheet_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_sheet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_column_header: Option<String>,
    #[serde(default)]
    pub exam_name: String,
    /// 覆盖默认模型（可选）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hf_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_column_header: Option<String>,
}

impl ExamConfig {
    pub fn response_sheet_name(&self) -> &str {
        non_empty(self.response_sheet_name.as_deref()).unwrap_or(DEFAULT_RESPONSE_SHEET)
    }

    pub fn email_column_header(&self) -> &str {
        non_empty(self.email_column_header.as_deref()).unwrap_or(DEFAULT_EMAIL_HEADER)
    }

    pub fn name_column_header(&self) -> Option<&str> {
        non_empty(self.name_column_header.as_deref())
    }

    pub fn model_override(&self) -> Option<&str> {
        non_empty(self.hf_model.as_deref())
    }
}

/// 考试配置文件（`[[exams]]` 列表）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamConfigFile {
    #[serde(default)]
    pub exams: Vec<ExamConfig>,
}

/// 答案表中的一行
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerKeyRow {
    #[serde(default)]
    pub question_header: Option<String>,
    #[serde(default)]
    pub question_id: Option<String>,
    #[serde(default)]
    pub criteria_json: Option<String>,
}

/// 某个回复表格的答案表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerKey {
    pub response_spreadsheet_id: String,
    #[serde(default)]
    pub rows: Vec<AnswerKeyRow>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
