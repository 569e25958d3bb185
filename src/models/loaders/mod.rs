pub mod toml_loader;

pub use toml_loader::{load_all_submissions, load_answer_keys, load_exam_configs, load_submission};
