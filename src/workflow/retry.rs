//! 重试控制器 - 流程层
//!
//! 核心职责：在预算之内把一道题磨到答对
//!
//! 控制规则：
//! - 每道题最多尝试 `max_retries` 次，答对立即返回
//! - 每次尝试整体受会话剩余预算约束，超时丢弃在途调用
//! - 上一次尝试的耗时装不进剩余预算时不再开新尝试
//! - 策略缺前置条件时换直接提问兜底再试一次

use std::sync::Arc;

use tokio::time::{sleep, timeout, Duration, Instant};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::Collaborators;
use crate::models::{
    AttemptRecord, AttemptResult, Question, QuizSession, SubmissionOutcome,
};
use crate::solvers::SolverStrategy;
use crate::workflow::question_ctx::QuestionCtx;
use crate::workflow::question_flow::QuestionFlow;

/// 一道题处理完的结果
#[derive(Debug)]
pub struct QuestionOutcome {
    /// 下一题的 URL，链条结束时为空
    pub next_url: Option<String>,
}

/// 重试控制器
///
/// - 持有题目流程，按预算和重试上限驱动它
/// - 决定每次尝试失败后是重试、换策略还是放弃
/// - 不解题、不提交，这些是流程的事
pub struct AttemptController {
    flow: QuestionFlow,
    max_retries: u32,
    retry_delay: Duration,
}

impl AttemptController {
    /// 创建新的重试控制器
    pub fn new(config: &Config, collab: Collaborators) -> AppResult<Self> {
        Ok(Self {
            flow: QuestionFlow::new(config, collab)?,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// 处理一道题：渲染、解题、提交，答错在预算内重试
    ///
    /// # 返回
    /// - `Ok(QuestionOutcome)`: 答对了，带着下一题的 URL
    /// - `Err(BudgetExceeded)`: 会话预算耗尽，调用方应结束会话
    /// - `Err(RetriesExhausted)`: 重试次数用完仍没答对
    pub async fn run_question(
        &self,
        session: &mut QuizSession,
        url: &str,
        question_index: usize,
    ) -> AppResult<QuestionOutcome> {
        let ctx = QuestionCtx::new(session.id.clone(), question_index, url.to_string());
        info!("{} 📥 开始处理: {}", ctx, url);

        // 页面只渲染一次，重试时复用题目换答案
        let mut state: Option<(Question, Arc<dyn SolverStrategy>)> = None;
        let mut prev_elapsed = Duration::ZERO;

        for attempt in 1..=self.max_retries {
            let remaining = session.remaining();
            if remaining.is_zero() {
                warn!("{} ❌ 会话预算耗尽，停止尝试", ctx);
                return Err(AppError::budget_exceeded(session.elapsed(), session.budget()));
            }
            // 上一次都没在这点时间里跑完，再开一次也只会超时
            if prev_elapsed > remaining {
                warn!(
                    "{} ❌ 剩余预算 {:?} 装不下一次尝试（上次耗时 {:?}），放弃",
                    ctx, remaining, prev_elapsed
                );
                return Err(AppError::budget_exceeded(session.elapsed(), session.budget()));
            }

            info!(
                "{} 第 {}/{} 次尝试 (预算剩余 {:?})",
                ctx, attempt, self.max_retries, remaining
            );
            let started = Instant::now();

            // 整次尝试包在剩余预算的超时里，超时即丢弃在途的渲染和 LLM 调用
            let attempt_result = timeout(remaining, async {
                let (question, strategy) = match state.as_ref() {
                    Some((question, strategy)) => (question, strategy.clone()),
                    None => {
                        let prepared = self.flow.prepare(url, &ctx).await?;
                        let chosen = self.flow.strategy_for(prepared.category);
                        let (question, strategy) = &*state.insert((prepared, chosen));
                        (question, strategy.clone())
                    }
                };
                self.flow.attempt(question, strategy.as_ref(), &ctx).await
            })
            .await;

            let elapsed_ms = started.elapsed().as_millis() as u64;

            match attempt_result {
                Ok(Ok((answer, submission))) => match submission.outcome {
                    SubmissionOutcome::Correct => {
                        session.record(AttemptRecord {
                            question_url: url.to_string(),
                            attempt_number: attempt,
                            answer: Some(answer),
                            result: AttemptResult::Correct,
                            elapsed_ms,
                        });
                        return Ok(QuestionOutcome {
                            next_url: submission.next_url,
                        });
                    }
                    SubmissionOutcome::Incorrect => {
                        session.record(AttemptRecord {
                            question_url: url.to_string(),
                            attempt_number: attempt,
                            answer: Some(answer),
                            result: AttemptResult::Incorrect,
                            elapsed_ms,
                        });
                    }
                    SubmissionOutcome::Error => {
                        session.record(AttemptRecord {
                            question_url: url.to_string(),
                            attempt_number: attempt,
                            answer: Some(answer),
                            result: AttemptResult::NetworkError,
                            elapsed_ms,
                        });
                    }
                },
                Ok(Err(e)) => {
                    let result = match &e {
                        AppError::Solve(_) | AppError::Extraction(_) | AppError::Formatting(_) => {
                            AttemptResult::Malformed
                        }
                        _ => AttemptResult::NetworkError,
                    };
                    session.record(AttemptRecord {
                        question_url: url.to_string(),
                        attempt_number: attempt,
                        answer: None,
                        result,
                        elapsed_ms,
                    });
                    warn!("{} ⚠️ 第 {} 次尝试失败: {}", ctx, attempt, e);

                    self.maybe_switch_to_fallback(&e, &mut state, &ctx);
                }
                Err(_) => {
                    // 超时，在途调用已随 future 一起丢弃
                    session.record(AttemptRecord {
                        question_url: url.to_string(),
                        attempt_number: attempt,
                        answer: None,
                        result: AttemptResult::NetworkError,
                        elapsed_ms,
                    });
                    warn!("{} ❌ 尝试超出剩余预算，已中止在途调用", ctx);
                    return Err(AppError::budget_exceeded(session.elapsed(), session.budget()));
                }
            }

            prev_elapsed = started.elapsed();

            if attempt < self.max_retries && !self.retry_delay.is_zero() {
                sleep(self.retry_delay).await;
            }
        }

        warn!("{} ❌ 重试 {} 次仍未答对", ctx, self.max_retries);
        Err(AppError::RetriesExhausted {
            question_url: url.to_string(),
            attempts: self.max_retries,
        })
    }

    /// 策略报缺前置条件时，换直接提问兜底
    fn maybe_switch_to_fallback(
        &self,
        error: &AppError,
        state: &mut Option<(Question, Arc<dyn SolverStrategy>)>,
        ctx: &QuestionCtx,
    ) {
        let recoverable = matches!(
            error,
            AppError::Solve(_) | AppError::Extraction(_) | AppError::Formatting(_)
        );
        if !recoverable {
            return;
        }

        if let Some((_, strategy)) = state.as_mut() {
            let fallback = self.flow.fallback_strategy();
            if strategy.name() != fallback.name() {
                info!("{} ✓ 换用兜底策略 {} 重试", ctx, fallback.name());
                *strategy = fallback;
            }
        }
    }
}
