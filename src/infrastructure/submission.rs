//! 答案提交客户端 - 基础设施层
//!
//! 把答案 POST 到题目页面声明的提交端点，并解读平台的判分结果

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, FetchError};
use crate::models::{Answer, SubmissionOutcome, SubmissionResult};

/// 平台判分响应
#[derive(Debug, Deserialize)]
struct SubmitReply {
    #[serde(default)]
    correct: bool,
    /// 下一题的 URL，链条结束时缺失
    url: Option<String>,
    /// 答错时平台给出的原因
    reason: Option<String>,
}

/// 答案提交能力
///
/// 职责：
/// - 把答案连同身份凭据提交给平台
/// - 解读判分结果（对 / 错 / 网络失败）
/// - 不认识 Session，不决定是否重试
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    /// 提交答案
    ///
    /// 网络失败和响应解析失败不报 Err，而是折叠成
    /// `SubmissionOutcome::Error`，由上层决定如何重试
    async fn submit(
        &self,
        submit_url: &str,
        question_url: &str,
        answer: &Answer,
    ) -> SubmissionResult;
}

/// 基于 reqwest 的提交客户端
pub struct HttpSubmissionClient {
    client: reqwest::Client,
    email: String,
    secret: String,
}

impl HttpSubmissionClient {
    /// 创建新的提交客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                AppError::Fetch(FetchError::ClientBuildFailed {
                    source: Box::new(e),
                })
            })?;

        Ok(Self {
            client,
            email: config.email.clone(),
            secret: config.secret.clone(),
        })
    }
}

#[async_trait]
impl SubmissionClient for HttpSubmissionClient {
    async fn submit(
        &self,
        submit_url: &str,
        question_url: &str,
        answer: &Answer,
    ) -> SubmissionResult {
        let payload = json!({
            "email": self.email,
            "secret": self.secret,
            "url": question_url,
            "answer": answer.to_submission_value(),
        });

        debug!("📤 提交答案到 {}: {}", submit_url, answer.preview());

        let response = match self.client.post(submit_url).json(&payload).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("提交请求失败: {}", e);
                return SubmissionResult {
                    outcome: SubmissionOutcome::Error,
                    next_url: None,
                    message: Some(format!("提交请求失败: {}", e)),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("提交返回错误状态: {}", status);
            return SubmissionResult {
                outcome: SubmissionOutcome::Error,
                next_url: None,
                message: Some(format!("提交返回错误状态: {}", status)),
            };
        }

        let reply: SubmitReply = match response.json().await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("解析判分响应失败: {}", e);
                return SubmissionResult {
                    outcome: SubmissionOutcome::Error,
                    next_url: None,
                    message: Some(format!("解析判分响应失败: {}", e)),
                };
            }
        };

        let outcome = if reply.correct {
            SubmissionOutcome::Correct
        } else {
            SubmissionOutcome::Incorrect
        };

        SubmissionResult {
            outcome,
            next_url: reply.url,
            message: reply.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_reply_deserialization() {
        let reply: SubmitReply =
            serde_json::from_str(r#"{"correct": true, "url": "https://quiz.example/q2"}"#)
                .expect("应能解析判分响应");

        assert!(reply.correct);
        assert_eq!(reply.url.as_deref(), Some("https://quiz.example/q2"));
        assert!(reply.reason.is_none());
    }

    #[test]
    fn test_submit_reply_defaults() {
        // 链条结束时平台只返回 correct，其余字段缺失
        let reply: SubmitReply = serde_json::from_str(r#"{"correct": false}"#).unwrap();

        assert!(!reply.correct);
        assert!(reply.url.is_none());
    }
}
