//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 批量提交处理器
//! - 加载考试配置、答案表和待处理的提交
//! - 逐份处理提交，输出全局统计信息
//!
//! ### `submission_processor` - 单份提交处理器
//! - 选择考试配置和答案表
//! - 提取题目，委托 GradingFlow 评分
//! - 写入评分记录，发送成绩通知
//!
//! ## 层次关系
//!
//! ```text
//! app (处理 Vec<Submission>)
//!     ↓
//! submission_processor (处理单份 Submission)
//!     ↓
//! workflow::GradingFlow (分块评分 Vec<GradableItem>)
//!     ↓
//! services (能力层：extract / prompt / recover / report)
//!     ↓
//! infrastructure (基础设施：ModelGateway)
//! ```

pub mod app;
pub mod submission_processor;

// 重新导出主要类型
pub use app::{App, ProcessingStats};
pub use submission_processor::{
    build_grade_rows, GatewayFactory, SkipReason, SubmissionOutcome, SubmissionProcessor,
    SubmissionReport,
};
