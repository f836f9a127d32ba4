//! 图表策略
//!
//! 题目要求提交一张图。渲染题目页面并整页截图，
//! 截图字节作为文件答案提交。

use async_trait::async_trait;
use tracing::debug;

use crate::error::AppResult;
use crate::infrastructure::Collaborators;
use crate::models::{Question, RawAnswer};
use crate::solvers::SolverStrategy;

pub struct VisualizationSolver;

#[async_trait]
impl SolverStrategy for VisualizationSolver {
    fn name(&self) -> &'static str {
        "visualization"
    }

    async fn solve(&self, question: &Question, collab: &Collaborators) -> AppResult<RawAnswer> {
        debug!("对题目页面截图: {}", question.url);

        let png = collab.renderer.screenshot(&question.url).await?;
        debug!("截图完成，{} 字节", png.len());

        Ok(RawAnswer::Binary {
            data: png,
            mime: "image/png".to_string(),
        })
    }
}
