//! 文档策略
//!
//! 题目要求下载文件（CSV / JSON / PDF / Excel）并从中找答案。
//! 表格类文件先尝试进程内计算，其余把提取出的内容交给 LLM。

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::{Collaborators, ExtractedData, FormatHint};
use crate::models::{Question, RawAnswer, ResourceKind};
use crate::solvers::tabular::analyze_table;
use crate::solvers::{SolverStrategy, MAX_CONTEXT_CHARS};
use crate::utils::truncate_text;

/// LLM 兜底时给的表格预览行数
const PREVIEW_ROWS: usize = 5;

pub struct DocumentSolver;

#[async_trait]
impl SolverStrategy for DocumentSolver {
    fn name(&self) -> &'static str {
        "document"
    }

    async fn solve(&self, question: &Question, collab: &Collaborators) -> AppResult<RawAnswer> {
        let resource = question
            .find_document()
            .ok_or_else(|| AppError::solve_no_resource("文档"))?;

        debug!("下载文档: {} ({:?})", resource.url, resource.kind);
        let bytes = collab.fetcher.fetch_bytes(&resource.url).await?;

        let hint = match resource.kind {
            ResourceKind::Csv => FormatHint::Csv,
            ResourceKind::Json => FormatHint::Json,
            ResourceKind::Pdf => FormatHint::Pdf,
            _ => FormatHint::Auto,
        };

        let context = match collab.extractor.extract(&bytes, hint)? {
            ExtractedData::Table(table) => {
                if let Some(n) = analyze_table(&table, &question.text) {
                    debug!("文档表格进程内计算得到答案: {}", n);
                    return Ok(RawAnswer::Number(n));
                }
                format!(
                    "Table: {} columns x {} rows\nColumns: {}\nFirst few rows:\n{}",
                    table.headers.len(),
                    table.rows.len(),
                    table.headers.join(", "),
                    table.preview(PREVIEW_ROWS)
                )
            }
            ExtractedData::Json(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            }
            ExtractedData::Text(text) => text,
        };

        let context = truncate_text(&context, MAX_CONTEXT_CHARS);
        let reply = collab
            .completion
            .complete(&question.text, Some(&context))
            .await?;

        Ok(RawAnswer::Text(reply))
    }
}
