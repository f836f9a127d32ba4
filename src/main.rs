use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

use quiz_auto_solve::logger;
use quiz_auto_solve::routes::{build_router, AppState};
use quiz_auto_solve::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载并校验配置
    let config = Config::load()?;

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    info!("🚀 答题服务启动");
    info!("📊 监听地址: http://{}", addr);
    info!("📊 使用模型: {}", config.llm_model_name);

    let app = build_router(Arc::new(AppState::new(config)));

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
