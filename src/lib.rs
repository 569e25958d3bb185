//! # Exam Grader
//!
//! 一个用 LLM 批量评阅主观题的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部资源，只暴露能力
//! - `ModelGateway` - 给定提示词，返回模型原始文本
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `answer_extractor` - 把提交拆成待评分题目
//! - `prompt_builder` - 构建批量评分提示词
//! - `result_recoverer` - 从不可靠的模型输出中还原逐题结果
//! - `report_sink` / `notification` - 写评分记录、渲染成绩通知
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一批题目"的完整评分流程
//! - `GradingFlow` - 分块 → 提示词 → 模型 → 解析 → 合并 → 默认值填充
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 批量提交处理器
//! - `orchestrator/submission_processor` - 单份提交处理器

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ConfigError, GatewayError, SinkError};
pub use infrastructure::{LlmGateway, ModelGateway};
pub use models::{BatchOutcome, GradableItem, QuestionResult, Submission};
pub use orchestrator::{App, SubmissionOutcome, SubmissionProcessor};
pub use workflow::{GradingFlow, SubmissionCtx};
