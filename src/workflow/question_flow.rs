//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整处理流程
//!
//! 流程顺序：
//! 1. 渲染页面 → 构建题目 → 判定题型
//! 2. 选策略 → 解题 → 格式化 → 提交

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppResult, SolveError};
use crate::infrastructure::Collaborators;
use crate::models::{Answer, Category, Question, RawAnswer, SubmissionOutcome, SubmissionResult};
use crate::services::{AnswerFormatter, TypeClassifier};
use crate::solvers::{SolverRouter, SolverStrategy};
use crate::utils::truncate_text;
use crate::workflow::question_ctx::QuestionCtx;

/// 题目处理流程
///
/// - 编排单道题的处理步骤
/// - 决定何时渲染、何时解题、何时提交
/// - 不持有重试计数，不管预算
/// - 只依赖业务能力（services / solvers）和协作者
pub struct QuestionFlow {
    classifier: TypeClassifier,
    formatter: AnswerFormatter,
    router: SolverRouter,
    collab: Collaborators,
}

impl QuestionFlow {
    /// 创建新的题目处理流程
    pub fn new(config: &Config, collab: Collaborators) -> AppResult<Self> {
        Ok(Self {
            classifier: TypeClassifier::from_config(config)?,
            formatter: AnswerFormatter,
            router: SolverRouter::new(),
            collab,
        })
    }

    /// 渲染题目页面，构建题目并判定题型
    pub async fn prepare(&self, url: &str, ctx: &QuestionCtx) -> AppResult<Question> {
        info!("{} 🔍 渲染题目页面: {}", ctx, url);

        let page = self.collab.renderer.render(url).await?;
        let mut question = Question::from_rendered(url, &page)?;
        question.category = self
            .classifier
            .classify(&question.text, &question.resources);

        self.log_question(ctx, &question);

        Ok(question)
    }

    /// 用指定策略完成一次"解题 → 格式化 → 提交"
    pub async fn attempt(
        &self,
        question: &Question,
        strategy: &dyn SolverStrategy,
        ctx: &QuestionCtx,
    ) -> AppResult<(Answer, SubmissionResult)> {
        // 提交端点在解题前检查，缺了就不必跑策略
        let submit_url =
            question
                .submit_url
                .as_deref()
                .ok_or_else(|| SolveError::MissingSubmitEndpoint {
                    page_url: question.url.clone(),
                })?;

        info!("{} 🔍 使用策略 {} 解题...", ctx, strategy.name());
        let raw = strategy.solve(question, &self.collab).await?;

        if let RawAnswer::Text(text) = &raw {
            if text.trim().is_empty() {
                return Err(SolveError::EmptyAnswer {
                    strategy: strategy.name().to_string(),
                }
                .into());
            }
        }

        let answer = self.formatter.format(raw, question.category)?;

        info!("{} 📤 提交答案: {}", ctx, answer.preview());
        let submission = self
            .collab
            .submitter
            .submit(submit_url, &question.url, &answer)
            .await;
        self.log_submission(ctx, &submission);

        Ok((answer, submission))
    }

    /// 按题型选择策略
    pub fn strategy_for(&self, category: Category) -> Arc<dyn SolverStrategy> {
        self.router.route(category)
    }

    /// 兜底策略（直接提问）
    pub fn fallback_strategy(&self) -> Arc<dyn SolverStrategy> {
        self.router.fallback()
    }

    // ========== 日志辅助方法 ==========

    /// 显示题目概要
    fn log_question(&self, ctx: &QuestionCtx, question: &Question) {
        info!("{} 题干: {}", ctx, truncate_text(&question.text, 80));
        info!(
            "{} ✓ 题型: {}，发现 {} 个资源",
            ctx,
            question.category,
            question.resources.len()
        );
    }

    /// 显示判分结果
    fn log_submission(&self, ctx: &QuestionCtx, submission: &SubmissionResult) {
        match submission.outcome {
            SubmissionOutcome::Correct => {
                info!("{} ✅ 答案正确", ctx);
            }
            SubmissionOutcome::Incorrect => {
                let reason = submission.message.as_deref().unwrap_or("平台未给出原因");
                warn!("{} ⚠️ 答案错误: {}", ctx, reason);
            }
            SubmissionOutcome::Error => {
                let reason = submission.message.as_deref().unwrap_or("未知错误");
                warn!("{} ❌ 提交失败: {}", ctx, reason);
            }
        }
    }
}
