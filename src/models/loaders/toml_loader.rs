use crate::error::ConfigError;
use crate::models::exam::{AnswerKey, ExamConfig, ExamConfigFile};
use crate::models::submission::Submission;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

async fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::read_failed(path.display().to_string(), e))?;

    toml::from_str(&content).map_err(|e| ConfigError::toml_parse_failed(path.display().to_string(), e))
}

async fn list_toml_files(folder_path: &str) -> Result<Vec<PathBuf>, ConfigError> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(ConfigError::DirectoryNotFound {
            path: folder_path.to_string(),
        });
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| ConfigError::read_failed(folder_path, e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ConfigError::read_failed(folder_path, e))?
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }

    // 按文件名处理，保证顺序稳定
    toml_files.sort();
    Ok(toml_files)
}

/// 加载考试配置，忽略没有回复表格 ID 的记录
pub async fn load_exam_configs(path: &Path) -> Result<Vec<ExamConfig>, ConfigError> {
    let file: ExamConfigFile = read_toml(path).await?;
    let exams: Vec<ExamConfig> = file
        .exams
        .into_iter()
        .filter(|exam| !exam.response_spreadsheet_id.trim().is_empty())
        .collect();

    tracing::info!("成功加载 {} 个考试配置", exams.len());
    Ok(exams)
}

/// 加载目录中的所有答案表，按回复表格 ID 索引
pub async fn load_answer_keys(folder_path: &str) -> Result<HashMap<String, AnswerKey>, ConfigError> {
    let mut answer_keys = HashMap::new();

    for path in list_toml_files(folder_path).await? {
        match read_toml::<AnswerKey>(&path).await {
            Ok(key) => {
                tracing::info!(
                    "成功加载答案表 {} ({} 行)",
                    key.response_spreadsheet_id,
                    key.rows.len()
                );
                answer_keys.insert(key.response_spreadsheet_id.clone(), key);
            }
            Err(e) => {
                tracing::warn!("加载答案表失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(answer_keys)
}

/// 从 TOML 文件加载一次提交
pub async fn load_submission(path: &Path) -> Result<Submission, ConfigError> {
    let mut submission: Submission = read_toml(path).await?;

    // 设置文件路径
    submission.file_path = Some(path.to_string_lossy().to_string());

    Ok(submission)
}

/// 从文件夹中加载所有提交
pub async fn load_all_submissions(folder_path: &str) -> Result<Vec<Submission>, ConfigError> {
    let mut submissions = Vec::new();

    for path in list_toml_files(folder_path).await? {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_submission(&path).await {
            Ok(submission) => submissions.push(submission),
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(submissions)
}
