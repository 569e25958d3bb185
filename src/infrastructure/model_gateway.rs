//! 模型网关 - 基础设施层
//!
//! 只暴露"给定提示词，返回模型原始文本"的能力，不认识题目和评分结果。
//!
//! ## 技术栈
//! - 使用 `async-openai` 的类型构建请求体
//! - 使用 `reqwest` 发送请求，以便保留 HTTP 状态码和响应体
//! - 兼容 OpenAI Chat Completions 协议的服务（如 Groq）

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GatewayError;

/// 系统消息
pub const SYSTEM_MESSAGE: &str = "You are a strict exam grader. Always return valid JSON only.";

/// 模型网关
///
/// 每个分块最多调用一次，不做重试；失败由编排层吸收。
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError>;
}

/// 基于 HTTP 的模型网关
pub struct LlmGateway {
    http: reqwest::Client,
    api_key: String,
    api_base_url: String,
    model_name: String,
    temperature: f64,
    max_tokens: u32,
}

impl LlmGateway {
    /// 使用配置中的默认模型
    pub fn new(config: &Config) -> Self {
        Self::with_model(config, config.llm_model_name.clone())
    }

    /// 使用指定模型
    pub fn with_model(config: &Config, model_name: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.llm_api_key.clone(),
            api_base_url: config.llm_api_base_url.clone(),
            model_name: model_name.into(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base_url.trim_end_matches('/'))
    }

    fn build_request(&self, prompt: &str) -> Result<Value, GatewayError> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_MESSAGE)
            .build()
            .map_err(GatewayError::transport)?;

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(GatewayError::transport)?;

        let request: CreateChatCompletionRequest = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .max_tokens(self.max_tokens)
            .build()
            .map_err(GatewayError::transport)?;

        let mut body = serde_json::to_value(&request).map_err(GatewayError::transport)?;
        // builder 的 temperature 是 f32，序列化后会丢精度
        body["temperature"] = json!(self.temperature);
        // 要求模型只输出 JSON 对象
        body["response_format"] = json!({ "type": "json_object" });
        Ok(body)
    }
}

#[async_trait]
impl ModelGateway for LlmGateway {
    async fn invoke(&self, prompt: &str) -> Result<String, GatewayError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.len());

        let request = self.build_request(prompt)?;

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("LLM API 请求失败: {}", e);
                GatewayError::transport(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(GatewayError::transport)?;

        debug!("LLM API 响应状态: {}", status);

        if !status.is_success() {
            return Err(GatewayError::new(status.as_u16(), body));
        }

        extract_content(&body).ok_or_else(|| {
            GatewayError::new(status.as_u16(), format!("响应结构异常: {}", body))
        })
    }
}

/// 提取第一个 choice 的消息内容
fn extract_content(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}
