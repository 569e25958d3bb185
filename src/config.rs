use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f64,
    pub llm_max_tokens: u32,
    // --- 批量评分 ---
    /// 每次请求包含的题目数量
    pub chunk_size: usize,
    /// 两次分块请求之间的固定间隔（毫秒），0 表示不等待
    pub chunk_delay_ms: u64,
    // --- 输入 ---
    /// 考试配置文件（TOML）
    pub exam_config_file: String,
    /// 答案表目录，每个来源一个 TOML 文件
    pub answer_key_folder: String,
    /// 待评分的提交目录
    pub submission_folder: String,
    // --- 输出 ---
    /// 评分记录（JSON Lines）
    pub grades_output_file: String,
    /// 通知邮件输出目录
    pub outbox_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.groq.com/openai/v1".to_string(),
            llm_model_name: "llama-3.3-70b-versatile".to_string(),
            llm_temperature: 0.1,
            llm_max_tokens: 2048,
            chunk_size: 5,
            chunk_delay_ms: 0,
            exam_config_file: "exam_config.toml".to_string(),
            answer_key_folder: "answer_keys".to_string(),
            submission_folder: "submissions".to_string(),
            grades_output_file: "ai_grades.jsonl".to_string(),
            outbox_folder: "outbox".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_temperature),
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_max_tokens),
            chunk_size: std::env::var("CHUNK_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.chunk_size),
            chunk_delay_ms: std::env::var("CHUNK_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.chunk_delay_ms),
            exam_config_file: std::env::var("EXAM_CONFIG_FILE").unwrap_or(default.exam_config_file),
            answer_key_folder: std::env::var("ANSWER_KEY_FOLDER").unwrap_or(default.answer_key_folder),
            submission_folder: std::env::var("SUBMISSION_FOLDER").unwrap_or(default.submission_folder),
            grades_output_file: std::env::var("GRADES_OUTPUT_FILE").unwrap_or(default.grades_output_file),
            outbox_folder: std::env::var("OUTBOX_FOLDER").unwrap_or(default.outbox_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 检查调用模型前必须具备的配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}
