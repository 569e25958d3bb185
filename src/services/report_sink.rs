//! 评分结果输出 - 业务能力层
//!
//! 只负责"写评分记录"和"投递通知"，不关心评分流程

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::SinkError;

pub const STATUS_GRADED: &str = "graded_by_ai";
pub const SEE_FIRST_ROW: &str = "See first row for full batch output";

/// 一道题目的评分记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeRow {
    pub timestamp: DateTime<Local>,
    pub student_email: String,
    pub exam_name: String,
    pub question_id: String,
    pub question_header: String,
    pub score: f64,
    pub feedback: String,
    /// 序列化后的评分标准结果（JSON）
    pub criteria_results: String,
    pub improvement: String,
    pub raw_model_output: String,
    pub status: String,
}

/// 发给学生的通知
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// 结果输出
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// 追加一次提交的所有评分记录
    async fn append_rows(&self, rows: &[GradeRow]) -> Result<(), SinkError>;

    /// 投递通知
    async fn deliver(&self, notification: &Notification) -> Result<(), SinkError>;
}

/// 基于文件的结果输出
///
/// 评分记录以 JSON Lines 追加到文件；每封通知写成 outbox 目录下的一个 `.html`
/// 文件，收件人和主题写在同名 `.json` 文件中。
pub struct FileReportSink {
    grades_path: PathBuf,
    outbox_dir: PathBuf,
}

impl FileReportSink {
    pub fn new(grades_path: impl Into<PathBuf>, outbox_dir: impl Into<PathBuf>) -> Self {
        Self {
            grades_path: grades_path.into(),
            outbox_dir: outbox_dir.into(),
        }
    }

    fn notification_stem(notification: &Notification) -> String {
        let recipient: String = notification
            .to
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}_{}", Local::now().format("%Y%m%d%H%M%S%3f"), recipient)
    }
}

#[async_trait]
impl ReportSink for FileReportSink {
    async fn append_rows(&self, rows: &[GradeRow]) -> Result<(), SinkError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        for row in rows {
            buf.push_str(&serde_json::to_string(row)?);
            buf.push('\n');
        }

        let path = self.grades_path.display().to_string();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.grades_path)
            .await
            .map_err(|e| SinkError::write_failed(&path, e))?;

        file.write_all(buf.as_bytes())
            .await
            .map_err(|e| SinkError::write_failed(&path, e))?;
        file.flush()
            .await
            .map_err(|e| SinkError::write_failed(&path, e))?;

        debug!("写入 {} 条评分记录: {}", rows.len(), path);
        Ok(())
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
        let outbox = self.outbox_dir.display().to_string();
        fs::create_dir_all(&self.outbox_dir)
            .await
            .map_err(|e| SinkError::write_failed(&outbox, e))?;

        let stem = Self::notification_stem(notification);
        let html_path = self.outbox_dir.join(format!("{}.html", stem));
        let meta_path = self.outbox_dir.join(format!("{}.json", stem));

        let meta = serde_json::json!({
            "to": notification.to,
            "subject": notification.subject,
        });

        fs::write(&html_path, &notification.html_body)
            .await
            .map_err(|e| SinkError::write_failed(html_path.display().to_string(), e))?;
        fs::write(&meta_path, serde_json::to_vec_pretty(&meta)?)
            .await
            .map_err(|e| SinkError::write_failed(meta_path.display().to_string(), e))?;

        debug!("通知已写入: {}", html_path.display());
        Ok(())
    }
}

/// 内存中的结果输出，用于试运行和测试
#[derive(Default)]
pub struct MemoryReportSink {
    rows: Mutex<Vec<GradeRow>>,
    notifications: Mutex<Vec<Notification>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<GradeRow> {
        self.rows.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReportSink for MemoryReportSink {
    async fn append_rows(&self, rows: &[GradeRow]) -> Result<(), SinkError> {
        if let Ok(mut stored) = self.rows.lock() {
            stored.extend_from_slice(rows);
        }
        Ok(())
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), SinkError> {
        if let Ok(mut stored) = self.notifications.lock() {
            stored.push(notification.clone());
        }
        Ok(())
    }
}
