//! 会话驱动器 - 编排层
//!
//! ## 职责
//!
//! 本模块驱动一次完整的答题会话，是会话级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **跟链条**：从起始 URL 开始，答对一题沿 next_url 走到下一题
//! 2. **流程调度**：创建并复用 `AttemptController`
//! 3. **终态判定**：链条走完 → 完成；预算耗尽 → 过期；其余错误 → 失败
//! 4. **资源回收**：会话结束时关闭浏览器
//! 5. **报告输出**：生成 `SessionReport`

use tokio::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::Collaborators;
use crate::models::{QuizSession, SessionReport};
use crate::workflow::{AttemptController, QuestionOutcome};

/// 会话驱动器
pub struct SessionDriver {
    config: Config,
    collab: Collaborators,
    controller: AttemptController,
}

impl SessionDriver {
    /// 用现成的协作者创建驱动器
    pub fn new(config: Config, collab: Collaborators) -> AppResult<Self> {
        let controller = AttemptController::new(&config, collab.clone())?;
        Ok(Self {
            config,
            collab,
            controller,
        })
    }

    /// 装配生产环境协作者并创建驱动器
    ///
    /// 会启动无头浏览器
    pub async fn launch(config: Config) -> AppResult<Self> {
        let collab = Collaborators::launch(&config).await?;
        Self::new(config, collab)
    }

    /// 跑完整个会话，从起始 URL 一路答到链条结束或预算耗尽
    pub async fn run(self, start_url: &str) -> SessionReport {
        let session_id = short_session_id();
        log_session_start(&session_id, start_url, self.config.session_budget_secs);

        let budget = Duration::from_secs(self.config.session_budget_secs);
        let mut session = QuizSession::new(session_id.clone(), start_url, budget);

        let mut question_index = 0usize;
        let mut error: Option<String> = None;

        while let Some(url) = session.current_url.clone() {
            question_index += 1;
            log_question_start(&session_id, question_index);

            match self
                .controller
                .run_question(&mut session, &url, question_index)
                .await
            {
                Ok(QuestionOutcome { next_url }) => match next_url {
                    Some(next) => session.advance(Some(next)),
                    None => {
                        info!("[会话 {}] ✅ 链条走完，没有下一题", session_id);
                        session.advance(None);
                        session.complete();
                    }
                },
                Err(e @ AppError::BudgetExceeded { .. }) => {
                    warn!("[会话 {}] ⚠️ {}", session_id, e);
                    error = Some(e.to_string());
                    session.expire();
                    break;
                }
                Err(e) => {
                    error!("[会话 {}] ❌ {}", session_id, e);
                    error = Some(e.to_string());
                    session.fail();
                    break;
                }
            }
        }

        // 无论怎么结束都要把浏览器收掉
        self.collab.shutdown().await;

        let report = session.into_report(error);
        log_session_complete(&report);

        report
    }
}

/// 跑一次完整会话（生产入口）
///
/// 协作者装配失败时不报 Err，返回一份失败报告
pub async fn run_session(config: Config, start_url: &str) -> SessionReport {
    match SessionDriver::launch(config).await {
        Ok(driver) => driver.run(start_url).await,
        Err(e) => {
            error!("❌ 会话启动失败: {}", e);
            SessionReport::launch_failure(short_session_id(), start_url, e.to_string())
        }
    }
}

/// 生成短会话 ID（日志里全写 uuid 太长）
fn short_session_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

// ========== 日志辅助函数 ==========

fn log_session_start(session_id: &str, start_url: &str, budget_secs: u64) {
    info!("{}", "=".repeat(60));
    info!("🚀 答题会话启动 [会话 {}]", session_id);
    info!("📥 起始题目: {}", start_url);
    info!("📊 时间预算: {}s", budget_secs);
    info!("{}", "=".repeat(60));
}

fn log_question_start(session_id: &str, question_index: usize) {
    info!("\n[会话 {}] {}", session_id, "─".repeat(30));
    info!("[会话 {}] 第 {} 道题目", session_id, question_index);
}

fn log_session_complete(report: &SessionReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 会话统计 [会话 {}]", report.session_id);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("状态: {:?}", report.status);
    info!("✅ 答对题目: {}", report.questions_solved);
    info!("📤 总尝试次数: {}", report.total_attempts);
    info!("总耗时: {}ms", report.total_elapsed_ms);
    info!("{}", "=".repeat(60));
}
