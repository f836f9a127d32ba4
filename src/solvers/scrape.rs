//! 抓取策略
//!
//! 题目要求读取另一个网页的内容。渲染目标页面，把可见文本
//! 作为上下文交给 LLM。页面里没有可抓取的链接时退回纯文本提问。

use async_trait::async_trait;
use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::Collaborators;
use crate::models::{Question, RawAnswer, ResourceKind};
use crate::solvers::{SolverStrategy, MAX_CONTEXT_CHARS};
use crate::utils::truncate_text;

pub struct ScrapeSolver;

#[async_trait]
impl SolverStrategy for ScrapeSolver {
    fn name(&self) -> &'static str {
        "scrape"
    }

    async fn solve(&self, question: &Question, collab: &Collaborators) -> AppResult<RawAnswer> {
        // 要抓的是别的页面，题目页面自己不算
        let target = question
            .resources
            .iter()
            .find(|r| r.kind == ResourceKind::Page && r.url != question.url);

        let reply = match target {
            Some(resource) => {
                debug!("抓取目标页面: {}", resource.url);
                let page = collab.renderer.render(&resource.url).await?;
                let context = truncate_text(&page.text, MAX_CONTEXT_CHARS);
                collab
                    .completion
                    .complete(&question.text, Some(&context))
                    .await?
            }
            None => {
                debug!("页面中没有可抓取的链接，退回纯文本提问");
                collab.completion.complete(&question.text, None).await?
            }
        };

        Ok(RawAnswer::Text(reply))
    }
}
