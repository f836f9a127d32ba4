pub mod answer;
pub mod question;
pub mod session;

pub use answer::{Answer, AnswerKind, RawAnswer};
pub use question::{Category, Question, RenderedPage, Resource, ResourceKind};
pub use session::{
    AttemptRecord, AttemptResult, QuizSession, SessionReport, SessionStatus, SubmissionOutcome,
    SubmissionResult,
};
