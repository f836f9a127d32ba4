//! 基础设施层
//!
//! 对外部世界（浏览器、LLM、HTTP、字节流）的全部访问都从这里走。
//! 上层只面向 trait，测试时可以整层换成假实现。

pub mod completion;
pub mod data_extractor;
pub mod fetcher;
pub mod page_renderer;
pub mod submission;

pub use completion::{CompletionService, OpenAiCompletion};
pub use data_extractor::{BuiltinExtractor, DataExtractor, DataTable, ExtractedData, FormatHint};
pub use fetcher::{HttpFetcher, ResourceFetcher};
pub use page_renderer::{ChromiumRenderer, PageRenderer};
pub use submission::{HttpSubmissionClient, SubmissionClient};

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppResult;

/// 协作者集合
///
/// 一次会话用到的全部外部能力，打包传给流程层。
/// 全部字段是 trait 对象，生产环境和测试环境装配不同实现。
#[derive(Clone)]
pub struct Collaborators {
    pub renderer: Arc<dyn PageRenderer>,
    pub completion: Arc<dyn CompletionService>,
    pub fetcher: Arc<dyn ResourceFetcher>,
    pub extractor: Arc<dyn DataExtractor>,
    pub submitter: Arc<dyn SubmissionClient>,
}

impl Collaborators {
    /// 装配生产环境协作者
    ///
    /// 会启动无头浏览器，失败时整个会话无法开始
    pub async fn launch(config: &Config) -> AppResult<Self> {
        let renderer = ChromiumRenderer::launch(config).await?;

        Ok(Self {
            renderer: Arc::new(renderer),
            completion: Arc::new(OpenAiCompletion::new(config)),
            fetcher: Arc::new(HttpFetcher::new(config)?),
            extractor: Arc::new(BuiltinExtractor),
            submitter: Arc::new(HttpSubmissionClient::new(config)?),
        })
    }

    /// 释放外部资源
    pub async fn shutdown(&self) {
        self.renderer.close().await;
    }
}
