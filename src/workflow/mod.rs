pub mod question_ctx;
pub mod question_flow;
pub mod retry;

pub use question_ctx::QuestionCtx;
pub use question_flow::QuestionFlow;
pub use retry::{AttemptController, QuestionOutcome};
