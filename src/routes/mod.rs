//! ## 职责
//! HTTP 前门：把解题服务暴露成 REST 接口。
//!
//! ## 接口
//! - `POST /solve`      异步启动会话，立即返回受理确认
//! - `POST /solve-sync` 同步解题，等待整个会话跑完再返回报告
//! - `GET  /health`     健康检查
//! - `GET  /`           服务信息
//!
//! 处理器只做身份校验和参数转发，真正的解题由编排层完成。

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::Config;

pub mod http;

/// 路由层共享状态
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

/// 组装路由：接口 + 请求级 trace
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(http::root))
        .route("/solve", post(http::solve))
        .route("/solve-sync", post(http::solve_sync))
        .route("/health", get(http::health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
