//! HTTP 接口处理器
//!
//! 对外的响应消息用英文（平台侧可读），日志保持中文。

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::models::SessionStatus;
use crate::orchestrator::run_session;
use crate::routes::AppState;

/// 解题请求体
#[derive(Debug, Clone, Deserialize)]
pub struct QuizRequest {
    /// 注册邮箱
    pub email: String,
    /// 身份校验密钥
    pub secret: String,
    /// 起始题目地址
    pub url: String,
}

/// 解题接口的统一响应
#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// 带状态码的接口错误，序列化成 `{"error": "..."}`
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

/// 身份校验：密钥不符直接拒绝，邮箱不符仅告警放行
fn verify_request(state: &AppState, request: &QuizRequest) -> Result<(), ApiError> {
    if request.secret != state.config.secret {
        warn!("⚠️ 收到密钥错误的请求, email: {}", request.email);
        return Err(ApiError(
            StatusCode::FORBIDDEN,
            "Invalid secret".to_string(),
        ));
    }
    if request.email != state.config.email {
        warn!(
            "⚠️ 邮箱与配置不一致: {} (配置为 {})",
            request.email, state.config.email
        );
    }
    Ok(())
}

/// POST /solve
///
/// 校验通过后把会话甩到后台任务里跑，立即返回受理确认。
pub async fn solve(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuizRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    verify_request(&state, &request)?;
    info!("📥 收到解题请求: {}", request.url);

    let config = state.config.clone();
    let start_url = request.url.clone();
    tokio::spawn(async move {
        let report = run_session(config, &start_url).await;
        info!(
            "📊 后台会话 {} 结束: {:?}, 答对 {} 题",
            report.session_id, report.status, report.questions_solved
        );
    });

    Ok(Json(QuizResponse {
        success: true,
        message: "Quiz solving started".to_string(),
        details: Some(json!({
            "url": request.url,
            "email": request.email,
        })),
    }))
}

/// POST /solve-sync
///
/// 等整个会话跑完再返回完整报告，可能耗时到预算上限。
pub async fn solve_sync(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuizRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    verify_request(&state, &request)?;
    info!("📥 收到同步解题请求: {}", request.url);

    let report = run_session(state.config.clone(), &request.url).await;

    let success = report.status == SessionStatus::Completed;
    let message = if success {
        "Quiz solving completed"
    } else {
        "Quiz solving failed"
    };
    let details = serde_json::to_value(&report).ok();

    Ok(Json(QuizResponse {
        success,
        message: message.to_string(),
        details,
    }))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "quiz-auto-solve",
    }))
}

/// GET /
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "quiz-auto-solve",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/solve": "POST - Start solving a quiz (async)",
            "/solve-sync": "POST - Solve a quiz and wait for result",
            "/health": "GET - Health check",
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn state() -> AppState {
        AppState::new(Config {
            email: "student@example.com".to_string(),
            secret: "s3cret".to_string(),
            llm_api_key: "sk-test".to_string(),
            ..Config::default()
        })
    }

    fn request(email: &str, secret: &str) -> QuizRequest {
        QuizRequest {
            email: email.to_string(),
            secret: secret.to_string(),
            url: "https://quiz.example.com/q1".to_string(),
        }
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let state = state();
        let result = verify_request(&state, &request("student@example.com", "wrong"));
        match result {
            Err(ApiError(status, message)) => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(message, "Invalid secret");
            }
            Ok(()) => panic!("密钥错误的请求不应通过校验"),
        }
    }

    #[test]
    fn test_verify_allows_mismatched_email() {
        // 邮箱不一致只告警，不拒绝
        let state = state();
        assert!(verify_request(&state, &request("other@example.com", "s3cret")).is_ok());
    }

    #[test]
    fn test_quiz_response_omits_empty_details() {
        let response = QuizResponse {
            success: true,
            message: "ok".to_string(),
            details: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("details").is_none());
    }
}
