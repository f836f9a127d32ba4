pub mod classifier;
pub mod formatter;

pub use classifier::{ClassifierRule, TypeClassifier};
pub use formatter::AnswerFormatter;
