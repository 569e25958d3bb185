use async_trait::async_trait;
use exam_grader::models::{load_answer_keys, load_exam_configs, ExamConfig};
use exam_grader::services::FileReportSink;
use exam_grader::{App, Config, GatewayError, ModelGateway, SubmissionProcessor};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// 按调用顺序返回预设输出，用完后一律失败
struct ScriptedGateway {
    replies: Mutex<Vec<Result<String, GatewayError>>>,
}

impl ScriptedGateway {
    fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().rev().collect()),
        }
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn invoke(&self, _prompt: &str) -> Result<String, GatewayError> {
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(GatewayError::new(500, "exhausted")))
    }
}

const EXAMS: &str = r#"
[[exams]]
response_spreadsheet_id = "sheet-1"
exam_name = "Web Basics"
email_column_header = "Email Address"
name_column_header = "Full Name"
"#;

const ANSWER_KEY: &str = r#"
response_spreadsheet_id = "sheet-1"

[[rows]]
question_header = "What is HTML?"
question_id = "Q1"
criteria_json = '{"definition":4}'

[[rows]]
question_header = "What is CSS?"
question_id = "Q2"
criteria_json = '{"definition":4}'

[[rows]]
question_header = "Name a browser"
question_id = "Q3"
criteria_json = '{"example":2}'

[[rows]]
question_header = "What is HTTP?"
question_id = "Q4"
criteria_json = '{"definition":4}'
"#;

const SUBMISSION: &str = r#"
source_id = "sheet-1"
headers = ["Timestamp", "Email Address", "Full Name", "What is HTML?", "what is   css?", "Name a browser", "What is HTTP?"]
values = ["2026-10-19 09:00", "abebe@example.com", "Abebe Bikila", "Markup language", "Styling", "", "A protocol"]

[[named_values]]
header = "  Email   Address "
values = ["abebe@example.com"]

[[named_values]]
header = "Full Name"
values = ["Abebe Bikila"]
"#;

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

#[tokio::test]
async fn test_grade_submission_end_to_end() {
    let root = tempfile::tempdir().unwrap();
    let keys_dir = root.path().join("answer_keys");
    let subs_dir = root.path().join("submissions");
    std::fs::create_dir_all(&keys_dir).unwrap();
    std::fs::create_dir_all(&subs_dir).unwrap();

    write(root.path(), "exam_config.toml", EXAMS);
    write(&keys_dir, "sheet-1.toml", ANSWER_KEY);
    write(&subs_dir, "001.toml", SUBMISSION);

    let config = Config {
        llm_api_key: "test-key".to_string(),
        chunk_size: 3,
        submission_folder: subs_dir.to_string_lossy().to_string(),
        grades_output_file: root.path().join("ai_grades.jsonl").to_string_lossy().to_string(),
        outbox_folder: root.path().join("outbox").to_string_lossy().to_string(),
        ..Config::default()
    };

    // 第一块：外层结构被截断，Q2 的片段不是合法 JSON；第二块：网关失败
    let chunk_one = r#"Sure! {"results": [
        {"question_id": "Q1", "total_score": 4, "feedback": "Correct", "improvement": "Mention tags", "criteria_results": [{"id": "definition", "awarded": 4, "reason": "clear"}]},
        {"question_id": "Q2", "total_score": 2.5, "feedback": "Partly right", "criteria_results": [{"id": "definition", "awarded": 2.5, "reason": missing quotes}]}
    "#;
    let gateway = Arc::new(ScriptedGateway::new(vec![
        Ok(chunk_one.to_string()),
        Err(GatewayError::new(429, "rate limited")),
    ]));

    let exams = load_exam_configs(&root.path().join("exam_config.toml")).await.unwrap();
    let answer_keys = load_answer_keys(keys_dir.to_str().unwrap()).await.unwrap();
    let sink = Arc::new(FileReportSink::new(&config.grades_output_file, &config.outbox_folder));
    let processor = SubmissionProcessor::new(config.clone(), exams, answer_keys, sink)
        .with_gateway_factory(move |_exam: &ExamConfig| gateway.clone() as Arc<dyn ModelGateway>);

    let app = App::with_processor(config.clone(), processor);
    let stats = app.run().await.unwrap();
    assert_eq!(stats.graded, 1);
    assert_eq!(stats.failed, 0);

    let content = std::fs::read_to_string(&config.grades_output_file).unwrap();
    let rows: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(rows.len(), 4);

    let ids: Vec<&str> = rows.iter().map(|r| r["question_id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["Q1", "Q2", "Q3", "Q4"]);

    assert_eq!(rows[0]["score"], 4.0);
    assert_eq!(rows[0]["feedback"], "Correct");
    assert!(rows[0]["raw_model_output"]
        .as_str()
        .unwrap()
        .starts_with("--- CHUNK 1 ---"));

    // 字段兜底
    assert_eq!(rows[1]["score"], 2.5);
    assert_eq!(rows[1]["feedback"], "Partly right");
    assert_eq!(rows[1]["improvement"], "N/A");
    assert_eq!(rows[1]["criteria_results"], "[]");
    assert_eq!(rows[1]["raw_model_output"], "See first row for full batch output");

    // Q3 在第一块但没有结果，且未作答
    assert_eq!(rows[2]["score"], 0.0);
    assert_eq!(rows[2]["feedback"], "No answer was provided.");

    // Q4 所在的第二块失败
    assert_eq!(rows[3]["feedback"], "AI could not evaluate this response.");
    assert_eq!(rows[3]["improvement"], "Answer all required criteria clearly.");

    let outbox: Vec<_> = std::fs::read_dir(&config.outbox_folder)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    let html_path = outbox
        .iter()
        .find(|p| p.extension().and_then(|e| e.to_str()) == Some("html"))
        .unwrap();
    let html = std::fs::read_to_string(html_path).unwrap();
    assert!(html.contains("Dear <strong>Abebe Bikila</strong>"));
    assert!(html.contains("Total Score: 6.5"));
}

#[tokio::test]
async fn test_missing_config_abandons_submission() {
    let root = tempfile::tempdir().unwrap();
    let subs_dir = root.path().join("submissions");
    std::fs::create_dir_all(&subs_dir).unwrap();
    write(&subs_dir, "001.toml", &SUBMISSION.replace("sheet-1", "sheet-404"));

    let config = Config {
        llm_api_key: "test-key".to_string(),
        submission_folder: subs_dir.to_string_lossy().to_string(),
        grades_output_file: root.path().join("ai_grades.jsonl").to_string_lossy().to_string(),
        outbox_folder: root.path().join("outbox").to_string_lossy().to_string(),
        ..Config::default()
    };

    let sink = Arc::new(FileReportSink::new(&config.grades_output_file, &config.outbox_folder));
    let processor = SubmissionProcessor::new(config.clone(), Vec::new(), Default::default(), sink)
        .with_gateway_factory(|_exam: &ExamConfig| {
            Arc::new(ScriptedGateway::new(Vec::new())) as Arc<dyn ModelGateway>
        });

    let stats = App::with_processor(config.clone(), processor).run().await.unwrap();
    assert_eq!(stats.failed, 1);
    assert!(!Path::new(&config.grades_output_file).exists());
    assert!(!Path::new(&config.outbox_folder).exists());
}
