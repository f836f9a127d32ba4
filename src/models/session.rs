//! 会话数据模型
//!
//! 时间计算全部基于 `tokio::time::Instant`，测试里可以用
//! 虚拟时钟推进。

use serde::Serialize;
use tokio::time::{Duration, Instant};

use crate::models::answer::Answer;

/// 会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Completed,
    Expired,
    Failed,
}

/// 单次作答的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptResult {
    Correct,
    Incorrect,
    /// 答案无法规范化成题型接受的格式（未提交）
    Malformed,
    /// 渲染、下载、LLM 或提交环节的故障
    NetworkError,
}

/// 一次作答的完整记录
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub question_url: String,
    /// 第几次尝试（从 1 开始）
    pub attempt_number: u32,
    pub answer: Option<Answer>,
    pub result: AttemptResult,
    pub elapsed_ms: u64,
}

/// 答案提交的判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Correct,
    Incorrect,
    /// 传输故障、非 200 状态或响应无法解析
    Error,
}

/// 一次答案提交的结果
///
/// 提交环节的故障以 `outcome = Error` 的形式返回，永远不会让
/// 工作流崩溃。
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    pub outcome: SubmissionOutcome,
    /// 服务端返回的下一题地址（只在答对时跟随）
    pub next_url: Option<String>,
    /// 服务端给出的原因或故障描述
    pub message: Option<String>,
}

/// 答题会话
///
/// 状态转移是单向的：`Running` 进入任一终态后不再改变。
#[derive(Debug)]
pub struct QuizSession {
    pub id: String,
    pub start_url: String,
    /// 下一道要处理的题目地址（None 表示链条走完）
    pub current_url: Option<String>,
    status: SessionStatus,
    history: Vec<AttemptRecord>,
    started_at: Instant,
    budget: Duration,
}

impl QuizSession {
    pub fn new(id: impl Into<String>, start_url: impl Into<String>, budget: Duration) -> Self {
        let start_url = start_url.into();
        Self {
            id: id.into(),
            current_url: Some(start_url.clone()),
            start_url,
            status: SessionStatus::Running,
            history: Vec::new(),
            started_at: Instant::now(),
            budget,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn history(&self) -> &[AttemptRecord] {
        &self.history
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// 剩余时间预算（耗尽后为零）
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    pub fn record(&mut self, attempt: AttemptRecord) {
        self.history.push(attempt);
    }

    /// 前往下一题；传入 None 表示链条走完
    pub fn advance(&mut self, next_url: Option<String>) {
        self.current_url = next_url;
    }

    pub fn complete(&mut self) {
        self.transition(SessionStatus::Completed);
    }

    pub fn expire(&mut self) {
        self.transition(SessionStatus::Expired);
    }

    pub fn fail(&mut self) {
        self.transition(SessionStatus::Failed);
    }

    // 终态不可离开
    fn transition(&mut self, to: SessionStatus) {
        if self.status == SessionStatus::Running {
            self.status = to;
        }
    }

    /// 答对的题目数量
    pub fn correct_count(&self) -> usize {
        self.history
            .iter()
            .filter(|a| a.result == AttemptResult::Correct)
            .count()
    }

    /// 生成会话结束后的汇总报告
    pub fn into_report(self, error: Option<String>) -> SessionReport {
        let questions_solved = self.correct_count();
        let total_elapsed_ms = self.elapsed().as_millis() as u64;
        SessionReport {
            session_id: self.id,
            start_url: self.start_url,
            status: self.status,
            questions_solved,
            total_attempts: self.history.len(),
            total_elapsed_ms,
            finished_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            error,
            history: self.history,
        }
    }
}

/// 会话汇总报告
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub start_url: String,
    pub status: SessionStatus,
    pub questions_solved: usize,
    pub total_attempts: usize,
    pub total_elapsed_ms: u64,
    pub finished_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub history: Vec<AttemptRecord>,
}

impl SessionReport {
    /// 协作组件启动失败时的报告（会话未能真正开始）
    pub fn launch_failure(
        session_id: impl Into<String>,
        start_url: impl Into<String>,
        error: String,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            start_url: start_url.into(),
            status: SessionStatus::Failed,
            questions_solved: 0,
            total_attempts: 0,
            total_elapsed_ms: 0,
            finished_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            error: Some(error),
            history: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> QuizSession {
        QuizSession::new("abc123", "https://quiz.example.com/q1", Duration::from_secs(180))
    }

    #[tokio::test]
    async fn test_status_transitions_are_monotonic() {
        let mut s = session();
        assert_eq!(s.status(), SessionStatus::Running);

        s.complete();
        assert_eq!(s.status(), SessionStatus::Completed);

        // 终态后的转移被忽略
        s.fail();
        assert_eq!(s.status(), SessionStatus::Completed);
        s.expire();
        assert_eq!(s.status(), SessionStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_saturates_at_zero() {
        let s = session();
        tokio::time::advance(Duration::from_secs(200)).await;
        assert_eq!(s.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_tracks_virtual_clock() {
        let s = session();
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(s.remaining(), Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_report_counts_correct_attempts() {
        let mut s = session();
        s.record(AttemptRecord {
            question_url: "https://quiz.example.com/q1".to_string(),
            attempt_number: 1,
            answer: None,
            result: AttemptResult::Incorrect,
            elapsed_ms: 10,
        });
        s.record(AttemptRecord {
            question_url: "https://quiz.example.com/q1".to_string(),
            attempt_number: 2,
            answer: Some(Answer::Number(4.0)),
            result: AttemptResult::Correct,
            elapsed_ms: 12,
        });
        s.complete();

        let report = s.into_report(None);
        assert_eq!(report.questions_solved, 1);
        assert_eq!(report.total_attempts, 2);
        assert_eq!(report.status, SessionStatus::Completed);
    }
}
