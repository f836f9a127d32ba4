//! 页面渲染器 - 基础设施层
//!
//! 持有唯一的浏览器资源，只暴露"渲染页面"和"截图"的能力

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Page};
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

use crate::browser::launch_headless_browser;
use crate::config::Config;
use crate::error::{AppError, AppResult, RenderError};
use crate::models::RenderedPage;

/// 页面渲染能力
///
/// 职责：
/// - 渲染 JS 驱动的页面，返回 HTML 和可见文本
/// - 对页面截图
/// - 不认识 Question / Session
/// - 不处理业务流程
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// 渲染页面，等待 JS 执行完成后返回内容
    async fn render(&self, url: &str) -> AppResult<RenderedPage>;

    /// 截取整页截图，返回 PNG 字节
    async fn screenshot(&self, url: &str) -> AppResult<Vec<u8>>;

    /// 关闭底层资源
    async fn close(&self);
}

/// 基于无头 Chromium 的渲染器
pub struct ChromiumRenderer {
    browser: Mutex<Option<Browser>>,
    page: Page,
    nav_timeout: Duration,
    settle: Duration,
}

impl ChromiumRenderer {
    /// 启动无头浏览器并创建渲染器
    pub async fn launch(config: &Config) -> AppResult<Self> {
        let (browser, page) = launch_headless_browser(config).await?;

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            nav_timeout: Duration::from_secs(config.render_timeout_secs),
            settle: Duration::from_millis(config.render_settle_ms),
        })
    }

    /// 导航到目标页面并等待加载完成
    async fn navigate(&self, url: &str) -> AppResult<()> {
        debug!("导航到页面: {}", url);

        match timeout(self.nav_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(AppError::render_navigation_failed(url, e)),
            Err(_) => {
                return Err(RenderError::Timeout {
                    url: url.to_string(),
                }
                .into())
            }
        }

        // 导航事件可能已经结束，失败时不影响后续提取
        let _ = self.page.wait_for_navigation().await;

        // 等待页面上的 JS 渲染出内容
        sleep(self.settle).await;

        Ok(())
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(&self, url: &str) -> AppResult<RenderedPage> {
        self.navigate(url).await?;

        let html = self.page.content().await?;

        // body 可能不存在（比如纯 JSON 响应），此时退回空文本
        let text = self
            .page
            .evaluate("document.body ? document.body.innerText : ''")
            .await?
            .into_value::<String>()
            .unwrap_or_default();

        debug!(
            "页面渲染完成: {} (HTML {} 字符, 文本 {} 字符)",
            url,
            html.len(),
            text.len()
        );

        Ok(RenderedPage { html, text })
    }

    async fn screenshot(&self, url: &str) -> AppResult<Vec<u8>> {
        self.navigate(url).await?;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();

        let bytes = self.page.screenshot(params).await.map_err(|e| {
            AppError::Render(RenderError::ScreenshotFailed {
                url: url.to_string(),
                source: Box::new(e),
            })
        })?;

        debug!("截图完成: {} ({} 字节)", url, bytes.len());

        Ok(bytes)
    }

    async fn close(&self) {
        let mut guard = self.browser.lock().await;
        if let Some(mut browser) = guard.take() {
            if let Err(e) = browser.close().await {
                warn!("⚠️ 关闭浏览器失败: {}", e);
            }
        }
    }
}
