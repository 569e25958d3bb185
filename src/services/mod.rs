pub mod answer_extractor;
pub mod notification;
pub mod prompt_builder;
pub mod report_sink;
pub mod result_recoverer;

pub use answer_extractor::{extract_items, normalize_header, student_identity, StudentIdentity};
pub use notification::build_notification;
pub use prompt_builder::build_batch_grading_prompt;
pub use report_sink::{FileReportSink, GradeRow, MemoryReportSink, Notification, ReportSink};
pub use result_recoverer::{recover_results, ParsedShape};
