//! 直接提问策略
//!
//! 不取任何外部数据，把题目文本原样交给 LLM。
//! 也是其他策略缺前置条件时的兜底策略。

use async_trait::async_trait;
use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::Collaborators;
use crate::models::{Question, RawAnswer};
use crate::solvers::SolverStrategy;

pub struct DirectSolver;

#[async_trait]
impl SolverStrategy for DirectSolver {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn solve(&self, question: &Question, collab: &Collaborators) -> AppResult<RawAnswer> {
        debug!("直接提问 LLM，题目长度 {} 字符", question.text.len());

        let reply = collab.completion.complete(&question.text, None).await?;
        Ok(RawAnswer::Text(reply))
    }
}
