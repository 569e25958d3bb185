//! 批量提交处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责加载配置和提交，并逐份交给
//! `SubmissionProcessor` 处理。
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单份提交的细节
//! - **顺序处理**：提交之间不共享可变状态，一份失败不影响其余
//! - **全局统计**：汇总所有提交的处理结果

use std::path::Path;
use std::sync::Arc;

use tracing::{error, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{load_all_submissions, load_answer_keys, load_exam_configs, Submission};
use crate::orchestrator::submission_processor::{SubmissionOutcome, SubmissionProcessor};
use crate::services::FileReportSink;
use crate::utils::logging::{
    log_startup, log_submission_start, log_submissions_loaded, print_final_stats,
};

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub graded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
}

/// 应用主结构
pub struct App {
    config: Config,
    processor: SubmissionProcessor,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;
        log_startup(&config);

        let exams = load_exam_configs(Path::new(&config.exam_config_file)).await?;
        let answer_keys = load_answer_keys(&config.answer_key_folder).await?;
        let sink = Arc::new(FileReportSink::new(
            &config.grades_output_file,
            &config.outbox_folder,
        ));

        let processor = SubmissionProcessor::new(config.clone(), exams, answer_keys, sink);
        Ok(Self::with_processor(config, processor))
    }

    /// 使用现成的处理器
    pub fn with_processor(config: Config, processor: SubmissionProcessor) -> Self {
        Self { config, processor }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<ProcessingStats> {
        let submissions = load_all_submissions(&self.config.submission_folder).await?;

        if submissions.is_empty() {
            warn!("⚠️ 没有找到待处理的提交，程序结束");
            return Ok(ProcessingStats::default());
        }

        log_submissions_loaded(submissions.len());

        let stats = self.process_all(&submissions).await;
        print_final_stats(stats.graded, stats.skipped, stats.failed, stats.total);
        Ok(stats)
    }

    /// 逐份处理提交
    pub async fn process_all(&self, submissions: &[Submission]) -> ProcessingStats {
        let mut stats = ProcessingStats {
            total: submissions.len(),
            ..Default::default()
        };

        for (idx, submission) in submissions.iter().enumerate() {
            let label = submission.file_path.as_deref().unwrap_or(&submission.source_id);
            log_submission_start(idx + 1, submissions.len(), label);

            match self.processor.process(submission).await {
                Ok(SubmissionOutcome::Graded(_)) => stats.graded += 1,
                Ok(SubmissionOutcome::Skipped(reason)) => {
                    warn!("[提交 {}] 已跳过: {:?}", idx + 1, reason);
                    stats.skipped += 1;
                }
                Err(e) => {
                    error!("[提交 {}] ❌ 处理失败，已放弃: {}", idx + 1, e);
                    stats.failed += 1;
                }
            }
        }

        stats
    }
}
