use serde::{Deserialize, Serialize};

/// 按表头提交的值（保持原始顺序）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedValue {
    pub header: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// 一次表单提交
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    /// 回复表格 ID，用于选择考试配置
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    /// 回复表格的表头行
    #[serde(default)]
    pub headers: Vec<String>,
    /// 与表头按位置对齐的提交值
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub named_values: Vec<NamedValue>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl Submission {
    /// 按表头精确查找第一个提交值
    pub fn named_value(&self, header: &str) -> Option<&str> {
        self.named_values
            .iter()
            .find(|nv| nv.header == header)
            .and_then(|nv| nv.values.first())
            .map(String::as_str)
    }
}
