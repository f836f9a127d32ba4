//! 解题策略层
//!
//! 每种题型一个策略，统一实现 `SolverStrategy`。
//! 策略只负责"这道题怎么解"，不决定重试、不提交答案。
//! 缺少前置条件（比如 API 题没有 API 链接）时如实报错，
//! 由重试控制器决定是否换直接提问策略兜底。

pub mod api_fetch;
pub mod direct;
pub mod document;
pub mod scrape;
pub mod tabular;
pub mod visualization;

pub use api_fetch::ApiFetchSolver;
pub use direct::DirectSolver;
pub use document::DocumentSolver;
pub use scrape::ScrapeSolver;
pub use tabular::TabularSolver;
pub use visualization::VisualizationSolver;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::infrastructure::Collaborators;
use crate::models::{Category, Question, RawAnswer};

/// 喂给 LLM 的数据上下文长度上限（字符）
pub(crate) const MAX_CONTEXT_CHARS: usize = 8000;

/// 解题策略
#[async_trait]
pub trait SolverStrategy: Send + Sync {
    /// 策略名，用于日志和错误信息
    fn name(&self) -> &'static str;

    /// 解一道题，返回原始答案
    async fn solve(&self, question: &Question, collab: &Collaborators) -> AppResult<RawAnswer>;
}

/// 策略路由器
///
/// 职责：
/// - 按题型选择策略
/// - 提供兜底策略（直接提问）
/// - 不解题，不重试
pub struct SolverRouter {
    scrape: Arc<dyn SolverStrategy>,
    api_fetch: Arc<dyn SolverStrategy>,
    document: Arc<dyn SolverStrategy>,
    tabular: Arc<dyn SolverStrategy>,
    visualization: Arc<dyn SolverStrategy>,
    direct: Arc<dyn SolverStrategy>,
}

impl SolverRouter {
    pub fn new() -> Self {
        Self {
            scrape: Arc::new(ScrapeSolver),
            api_fetch: Arc::new(ApiFetchSolver),
            document: Arc::new(DocumentSolver),
            tabular: Arc::new(TabularSolver),
            visualization: Arc::new(VisualizationSolver),
            direct: Arc::new(DirectSolver),
        }
    }

    /// 按题型选择策略
    ///
    /// `DirectPrompt` 和 `Unknown` 都走直接提问
    pub fn route(&self, category: Category) -> Arc<dyn SolverStrategy> {
        match category {
            Category::Scrape => self.scrape.clone(),
            Category::ApiFetch => self.api_fetch.clone(),
            Category::Document => self.document.clone(),
            Category::TabularAnalysis => self.tabular.clone(),
            Category::Visualization => self.visualization.clone(),
            Category::DirectPrompt | Category::Unknown => self.direct.clone(),
        }
    }

    /// 兜底策略
    pub fn fallback(&self) -> Arc<dyn SolverStrategy> {
        self.direct.clone()
    }
}

impl Default for SolverRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_by_category() {
        let router = SolverRouter::new();

        assert_eq!(router.route(Category::Scrape).name(), "scrape");
        assert_eq!(router.route(Category::ApiFetch).name(), "api-fetch");
        assert_eq!(router.route(Category::Document).name(), "document");
        assert_eq!(
            router.route(Category::TabularAnalysis).name(),
            "tabular-analysis"
        );
        assert_eq!(
            router.route(Category::Visualization).name(),
            "visualization"
        );
    }

    #[test]
    fn test_unclassified_routes_to_direct() {
        let router = SolverRouter::new();

        assert_eq!(router.route(Category::DirectPrompt).name(), "direct");
        assert_eq!(router.route(Category::Unknown).name(), "direct");
        assert_eq!(router.fallback().name(), "direct");
    }
}
