use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppResult, RenderError};

/// 启动无头浏览器并创建一个空白页面
///
/// 返回的 `Browser` 必须由调用方持有到会话结束，`Page` 可以反复导航。
pub async fn launch_headless_browser(config: &Config) -> AppResult<(Browser, Page)> {
    info!("🚀 启动无头浏览器...");

    let mut builder = BrowserConfig::builder().args(vec![
        "--no-sandbox",              // 禁用沙盒，防止权限问题导致的崩溃
        "--disable-setuid-sandbox",
        "--disable-gpu",
        "--disable-dev-shm-usage",   // 防止共享内存不足
        "--window-size=1920,1080",
        "--user-agent=Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
    ]);

    if config.headless {
        builder = builder.new_headless_mode();
    } else {
        builder = builder.with_head();
    }

    if let Some(exe) = &config.chrome_executable {
        builder = builder.chrome_executable(Path::new(exe));
    }

    let browser_config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        RenderError::LaunchFailed {
            source: e.into(),
        }
    })?;

    // 启动浏览器
    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动无头浏览器失败: {}", e);
        RenderError::LaunchFailed {
            source: Box::new(e),
        }
    })?;
    debug!("无头浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    // 创建空白页面，后续由渲染器按需导航
    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        RenderError::PageCreationFailed {
            source: Box::new(e),
        }
    })?;

    info!("✅ 无头浏览器就绪");

    Ok((browser, page))
}
