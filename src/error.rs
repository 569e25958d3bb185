use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（整份提交被放弃）
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 结果输出错误
    #[error("输出错误: {0}")]
    Sink(#[from] SinkError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 没有与提交来源匹配的考试配置
    #[error("没有与来源 {source_id} 匹配的考试配置")]
    NoMatchingExam { source_id: String },
    /// 缺少答案表
    #[error("来源 {source_id} 缺少答案表")]
    AnswerKeyMissing { source_id: String },
    /// 缺少 API 密钥
    #[error("未设置 LLM_API_KEY")]
    MissingApiKey,
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 模型网关错误
///
/// 只在分块内出现，由评分流程吸收，不会上升为 `AppError`。
///
/// `status` 为 HTTP 状态码；传输层失败时没有状态码，记为 0。
#[derive(Debug, Error)]
#[error("模型网关返回 {status}: {body}")]
pub struct GatewayError {
    pub status: u16,
    pub body: String,
}

impl GatewayError {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 传输层失败（连接、超时等）
    pub fn transport(source: impl std::fmt::Display) -> Self {
        Self::new(0, source.to_string())
    }
}

/// 结果输出错误
#[derive(Debug, Error)]
pub enum SinkError {
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Sink(SinkError::Serialize(err))
    }
}

// ========== 便捷构造函数 ==========

impl ConfigError {
    pub fn read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        ConfigError::ReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn toml_parse_failed(path: impl Into<String>, source: toml::de::Error) -> Self {
        ConfigError::TomlParseFailed {
            path: path.into(),
            source,
        }
    }
}

impl SinkError {
    pub fn write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        SinkError::WriteFailed {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
