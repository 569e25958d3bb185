pub mod grading_flow;
pub mod submission_ctx;

pub use grading_flow::{chunk_items, Chunk, GradingFlow};
pub use submission_ctx::SubmissionCtx;
