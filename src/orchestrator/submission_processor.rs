//! 单份提交处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责一次表单提交的完整评分，是提交级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **选择配置**：按来源 ID 找到考试配置和答案表，找不到则放弃整份提交
//! 2. **提取题目**：把提交内容按答案表拆成待评分题目
//! 3. **批量评分**：委托 `GradingFlow` 完成分块评分和默认值填充
//! 4. **写入记录**：每道题目一行评分记录
//! 5. **发送通知**：有邮箱时渲染并投递成绩通知

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppResult, ConfigError};
use crate::infrastructure::{LlmGateway, ModelGateway};
use crate::models::{AnswerKey, BatchOutcome, ExamConfig, Submission};
use crate::services::report_sink::{SEE_FIRST_ROW, STATUS_GRADED};
use crate::services::{build_notification, extract_items, student_identity, GradeRow, ReportSink};
use crate::workflow::{GradingFlow, SubmissionCtx};

/// 根据考试配置创建模型网关
pub type GatewayFactory = Box<dyn Fn(&ExamConfig) -> Arc<dyn ModelGateway> + Send + Sync>;

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 答案表没有任何行
    EmptyAnswerKey,
    /// 没有可评分的题目
    NoGradableItems,
}

/// 一份提交的评分报告
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub ctx: SubmissionCtx,
    pub outcome: BatchOutcome,
    /// 是否已投递通知
    pub notified: bool,
}

/// 提交处理结果
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Graded(SubmissionReport),
    Skipped(SkipReason),
}

/// 单份提交处理器
pub struct SubmissionProcessor {
    config: Config,
    exams: Vec<ExamConfig>,
    answer_keys: HashMap<String, AnswerKey>,
    sink: Arc<dyn ReportSink>,
    gateway_factory: GatewayFactory,
}

impl SubmissionProcessor {
    /// 创建处理器，默认按考试配置中的模型创建 HTTP 网关
    pub fn new(
        config: Config,
        exams: Vec<ExamConfig>,
        answer_keys: HashMap<String, AnswerKey>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        let gateway_config = config.clone();
        let gateway_factory: GatewayFactory = Box::new(move |exam: &ExamConfig| {
            let gateway = match exam.model_override() {
                Some(model) => LlmGateway::with_model(&gateway_config, model),
                None => LlmGateway::new(&gateway_config),
            };
            Arc::new(gateway) as Arc<dyn ModelGateway>
        });

        Self {
            config,
            exams,
            answer_keys,
            sink,
            gateway_factory,
        }
    }

    /// 替换模型网关的创建方式
    pub fn with_gateway_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ExamConfig) -> Arc<dyn ModelGateway> + Send + Sync + 'static,
    {
        self.gateway_factory = Box::new(factory);
        self
    }

    /// 处理一份提交
    ///
    /// 配置缺失时返回 `ConfigError`，此时不会写入任何记录。
    pub async fn process(&self, submission: &Submission) -> AppResult<SubmissionOutcome> {
        let exam = self
            .exams
            .iter()
            .find(|exam| exam.response_spreadsheet_id == submission.source_id)
            .ok_or_else(|| ConfigError::NoMatchingExam {
                source_id: submission.source_id.clone(),
            })?;

        let identity = student_identity(exam, submission);
        let ctx = SubmissionCtx::new(
            submission.source_id.clone(),
            exam.exam_name.clone(),
            identity.email,
            identity.name,
        );

        if let Some(sheet) = submission.sheet_name.as_deref() {
            if sheet != exam.response_sheet_name() {
                warn!(
                    "{} ⚠️ 提交来自工作表 {}，配置为 {}",
                    ctx,
                    sheet,
                    exam.response_sheet_name()
                );
            }
        }

        let answer_key = self
            .answer_keys
            .get(&submission.source_id)
            .ok_or_else(|| ConfigError::AnswerKeyMissing {
                source_id: submission.source_id.clone(),
            })?;

        if answer_key.rows.is_empty() {
            warn!("{} ⚠️ 答案表为空，跳过", ctx);
            return Ok(SubmissionOutcome::Skipped(SkipReason::EmptyAnswerKey));
        }

        let items = extract_items(answer_key, submission);
        if items.is_empty() {
            warn!("{} ⚠️ 没有可评分的题目，跳过", ctx);
            return Ok(SubmissionOutcome::Skipped(SkipReason::NoGradableItems));
        }

        info!("{} 开始评分，共 {} 道题目", ctx, items.len());

        let flow = GradingFlow::new(&self.config, (self.gateway_factory)(exam));
        let outcome = flow.grade(&exam.exam_name, items).await;

        let rows = build_grade_rows(&ctx, &outcome, Local::now())?;
        self.sink.append_rows(&rows).await?;
        info!("{} ✓ 已写入 {} 条评分记录", ctx, rows.len());

        let notified = if ctx.has_email() {
            let notification = build_notification(
                &ctx.student_email,
                &ctx.exam_name,
                &ctx.student_name,
                &outcome,
            );
            self.sink.deliver(&notification).await?;
            info!("{} ✓ 成绩通知已发送至 {}", ctx, ctx.student_email);
            true
        } else {
            warn!("{} ⚠️ 没有学生邮箱，不发送通知", ctx);
            false
        };

        Ok(SubmissionOutcome::Graded(SubmissionReport {
            ctx,
            outcome,
            notified,
        }))
    }
}

/// 生成评分记录，完整的模型原始输出只写在第一行
pub fn build_grade_rows(
    ctx: &SubmissionCtx,
    outcome: &BatchOutcome,
    timestamp: DateTime<Local>,
) -> Result<Vec<GradeRow>, serde_json::Error> {
    outcome
        .graded
        .iter()
        .enumerate()
        .map(|(index, graded)| {
            Ok(GradeRow {
                timestamp,
                student_email: ctx.student_email.clone(),
                exam_name: ctx.exam_name.clone(),
                question_id: graded.item.id.clone(),
                question_header: graded.item.header.clone(),
                score: graded.result.total_score,
                feedback: graded.result.feedback.clone(),
                criteria_results: serde_json::to_string(&graded.result.criteria_results)?,
                improvement: graded.result.improvement.clone(),
                raw_model_output: if index == 0 {
                    outcome.raw_output.clone()
                } else {
                    SEE_FIRST_ROW.to_string()
                },
                status: STATUS_GRADED.to_string(),
            })
        })
        .collect()
}
