//! 日志初始化
//!
//! 通过 `RUST_LOG` 环境变量控制过滤级别，默认 `info`。

use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅器
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// 测试用初始化（重复调用不报错）
pub fn try_init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
