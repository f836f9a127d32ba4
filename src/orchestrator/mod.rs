//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责会话级的流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `session_driver` - 会话驱动器
//! - 装配协作者（浏览器、LLM、HTTP 客户端）
//! - 沿 next_url 链条逐题推进
//! - 判定会话终态（完成 / 预算耗尽 / 失败）
//! - 会话结束时回收资源
//! - 输出会话汇总报告
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::SessionDriver (处理整个会话链条)
//!     ↓
//! workflow::AttemptController (处理单个 Question 的重试)
//!     ↓
//! workflow::QuestionFlow (处理单次尝试)
//!     ↓
//! services / solvers (能力层：分类 / 解题 / 格式化)
//!     ↓
//! infrastructure (基础设施：渲染 / LLM / 下载 / 提交)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：driver 管链条推进，controller 管单题重试
//! 2. **资源隔离**：协作者由编排层装配和回收
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod session_driver;

// 重新导出主要类型
pub use session_driver::{run_session, SessionDriver};
