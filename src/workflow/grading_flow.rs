//! 批量评分流程 - 流程层
//!
//! 核心职责：定义"一批题目"的完整评分流程
//!
//! 流程顺序：
//! 1. 按固定大小分块（保持原顺序）
//! 2. 逐块：构建提示词 → 调用模型 → 解析结果
//! 3. 合并所有分块的结果，为没有结果的题目填充默认值

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::ModelGateway;
use crate::models::{BatchOutcome, GradableItem, GradedQuestion, QuestionResult};
use crate::services::{build_batch_grading_prompt, recover_results};

/// 一个分块
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    /// 分块序号（从1开始）
    pub number: usize,
    pub items: &'a [GradableItem],
}

/// 按固定大小切分题目，最后一块可能更小
pub fn chunk_items(items: &[GradableItem], chunk_size: usize) -> Vec<Chunk<'_>> {
    items
        .chunks(chunk_size.max(1))
        .enumerate()
        .map(|(idx, items)| Chunk {
            number: idx + 1,
            items,
        })
        .collect()
}

/// 批量评分流程
///
/// - 分块严格按顺序处理，不并发调用模型
/// - 单个分块失败不会中断整批，对应题目最终得到默认结果
/// - 保证输出覆盖每一道输入题目
pub struct GradingFlow {
    gateway: Arc<dyn ModelGateway>,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl GradingFlow {
    /// 创建新的评分流程
    pub fn new(config: &Config, gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            gateway,
            chunk_size: config.chunk_size.max(1),
            chunk_delay: Duration::from_millis(config.chunk_delay_ms),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub async fn grade(&self, exam_name: &str, items: Vec<GradableItem>) -> BatchOutcome {
        let mut recovered: Vec<QuestionResult> = Vec::new();
        let mut raw_output = String::new();

        for chunk in chunk_items(&items, self.chunk_size) {
            if chunk.number > 1 && !self.chunk_delay.is_zero() {
                tokio::time::sleep(self.chunk_delay).await;
            }

            info!(
                "📦 评分第 {} 块 ({} 道题目)...",
                chunk.number,
                chunk.items.len()
            );

            let prompt = build_batch_grading_prompt(exam_name, chunk.items);

            match self.gateway.invoke(&prompt).await {
                Ok(output) => {
                    raw_output.push_str(&format!("--- CHUNK {} ---\n{}\n\n", chunk.number, output));

                    let parsed = recover_results(&output, chunk.items.len());
                    info!("✓ 第 {} 块解析到 {} 个结果", chunk.number, parsed.len());
                    recovered.extend(parsed);
                }
                Err(e) => {
                    warn!("⚠️ 第 {} 块评分失败: {}", chunk.number, e);
                }
            }
        }

        let graded: Vec<GradedQuestion> = items
            .into_iter()
            .map(|item| {
                let matched = recovered.iter().find(|r| r.question_id == item.id).cloned();
                match matched {
                    Some(result) => GradedQuestion {
                        item,
                        result,
                        defaulted: false,
                    },
                    None => GradedQuestion {
                        result: QuestionResult::fallback_for(&item),
                        item,
                        defaulted: true,
                    },
                }
            })
            .collect();

        let outcome = BatchOutcome { graded, raw_output };
        if outcome.defaulted_count() > 0 {
            warn!(
                "⚠️ {} / {} 道题目没有模型结果，已填充默认值",
                outcome.defaulted_count(),
                outcome.len()
            );
        }
        outcome
    }
}
