//! 成绩通知邮件

use crate::models::{BatchOutcome, GradedQuestion};
use crate::services::report_sink::Notification;

/// 生成成绩通知
pub fn build_notification(
    email: &str,
    exam_name: &str,
    student_name: &str,
    outcome: &BatchOutcome,
) -> Notification {
    Notification {
        to: email.to_string(),
        subject: format!("Exam Result: {}", exam_name),
        html_body: render_email_html(exam_name, student_name, &outcome.graded),
    }
}

/// 渲染 HTML 邮件正文，总分为各题得分之和
pub fn render_email_html(exam_name: &str, student_name: &str, graded: &[GradedQuestion]) -> String {
    let total_score: f64 = graded.iter().map(|g| g.result.total_score).sum();

    let rows_html: String = graded.iter().map(render_question).collect();

    format!(
        r#"
<div style="font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; max-width: 600px; margin: 0 auto; color: #444; line-height: 1.6;">
  <div style="background-color: #2c3e50; color: white; padding: 30px 20px; text-align: center; border-radius: 8px 8px 0 0;">
    <h1 style="margin: 0; font-size: 24px;">Exam Results</h1>
    <p style="margin: 10px 0 0 0; opacity: 0.9;">{exam}</p>
  </div>
  <div style="padding: 20px; border: 1px solid #eee; border-top: none; border-radius: 0 0 8px 8px;">
    <p style="font-size: 18px; margin-top: 0;">Dear <strong>{student}</strong>,</p>
    <p>Here is the detailed breakdown of your performance as evaluated by the AI grading system.</p>
    <div style="background-color: #ebf5fb; padding: 15px; border-radius: 6px; text-align: center; margin: 20px 0;">
      <span style="font-size: 14px; color: #5dade2; text-transform: uppercase; font-weight: bold;">Overall Performance</span>
      <div style="font-size: 32px; font-weight: bold; color: #2e86c1; margin-top: 5px;">Total Score: {total}</div>
    </div>
{rows}
    <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee; text-align: center; font-size: 12px; color: #999;">
      <p>This is an automated grade report based on predefined criteria.</p>
    </div>
  </div>
</div>
"#,
        exam = escape_html(exam_name),
        student = escape_html(student_name),
        total = total_score,
        rows = rows_html,
    )
}

fn render_question(graded: &GradedQuestion) -> String {
    let criteria: String = graded
        .result
        .criteria_results
        .iter()
        .map(|c| {
            format!(
                "          <li><strong>{}:</strong> {} marks - <span style=\"font-style: italic;\">{}</span></li>\n",
                escape_html(&c.id),
                c.awarded,
                escape_html(&c.reason)
            )
        })
        .collect();

    format!(
        r#"    <div style="margin-bottom: 25px; padding: 15px; border-left: 4px solid #4a90e2; background-color: #f9f9f9; border-radius: 4px;">
      <h3 style="margin-top: 0; color: #333; font-size: 16px;">Question: {header}</h3>
      <span style="background-color: #4a90e2; color: white; padding: 4px 10px; border-radius: 20px; font-weight: bold; font-size: 14px;">Score: {score}</span>
      <p style="margin: 5px 0;"><strong>Feedback:</strong> {feedback}</p>
      <div style="margin: 10px 0; padding-left: 15px; border-left: 2px solid #ddd;">
        <p style="margin: 0 0 5px 0; font-size: 13px; color: #666; font-weight: bold;">Criteria Breakdown:</p>
        <ul style="margin: 0; padding-left: 20px; font-size: 13px; color: #555;">
{criteria}        </ul>
      </div>
      <p style="margin: 10px 0 0 0; color: #2c3e50; font-size: 14px;"><strong>Improvement Idea:</strong> {improvement}</p>
    </div>
"#,
        header = escape_html(&graded.item.header),
        score = graded.result.total_score,
        feedback = escape_html(&graded.result.feedback),
        criteria = criteria,
        improvement = escape_html(&graded.result.improvement),
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
