//! API 取数策略
//!
//! 题目要求调用一个数据接口。下载接口响应，能解析成 JSON 的
//! 格式化后作为上下文交给 LLM，不能解析的按原文给。

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::Collaborators;
use crate::models::{Question, RawAnswer, ResourceKind};
use crate::solvers::{SolverStrategy, MAX_CONTEXT_CHARS};
use crate::utils::truncate_text;

pub struct ApiFetchSolver;

#[async_trait]
impl SolverStrategy for ApiFetchSolver {
    fn name(&self) -> &'static str {
        "api-fetch"
    }

    async fn solve(&self, question: &Question, collab: &Collaborators) -> AppResult<RawAnswer> {
        let resource = question
            .find_resource(ResourceKind::Api)
            .ok_or_else(|| AppError::solve_no_resource("API"))?;

        debug!("调用数据接口: {}", resource.url);
        let body = collab.fetcher.fetch_text(&resource.url).await?;

        // JSON 响应格式化后更好读，其他响应原样传递
        let context = match serde_json::from_str::<JsonValue>(&body) {
            Ok(value) => serde_json::to_string_pretty(&value).unwrap_or(body),
            Err(_) => body,
        };

        let context = truncate_text(&context, MAX_CONTEXT_CHARS);
        let reply = collab
            .completion
            .complete(&question.text, Some(&context))
            .await?;

        Ok(RawAnswer::Text(reply))
    }
}
