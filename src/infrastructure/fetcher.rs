//! 资源下载器 - 基础设施层
//!
//! 只负责"按 URL 下载字节"能力，不认识资源的业务含义

use async_trait::async_trait;
use tokio::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, FetchError};

/// 资源下载能力
///
/// 职责：
/// - 下载题目页面引用的数据文件（CSV、JSON、PDF 等）
/// - 调用题目页面引用的数据 API
/// - 不认识 Question / Resource
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// 下载资源，返回原始字节
    async fn fetch_bytes(&self, url: &str) -> AppResult<Vec<u8>>;

    /// 下载资源并按 UTF-8 解码为文本
    async fn fetch_text(&self, url: &str) -> AppResult<String> {
        let bytes = self.fetch_bytes(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// 基于 reqwest 的下载器
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// 创建新的下载器
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                AppError::Fetch(FetchError::ClientBuildFailed {
                    source: Box::new(e),
                })
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &str) -> AppResult<Vec<u8>> {
        debug!("下载资源: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch_request_failed(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }));
        }

        let bytes = response.bytes().await.map_err(|e| {
            AppError::Fetch(FetchError::BodyReadFailed {
                url: url.to_string(),
                source: Box::new(e),
            })
        })?;

        debug!("下载完成: {} ({} 字节)", url, bytes.len());

        Ok(bytes.to_vec())
    }
}
