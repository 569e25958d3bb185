pub mod exam;
pub mod grade;
pub mod item;
pub mod loaders;
pub mod submission;

pub use exam::{AnswerKey, AnswerKeyRow, ExamConfig};
pub use grade::{BatchOutcome, CriterionResult, GradedQuestion, QuestionResult};
pub use item::GradableItem;
pub use loaders::{load_all_submissions, load_answer_keys, load_exam_configs, load_submission};
pub use submission::{NamedValue, Submission};
