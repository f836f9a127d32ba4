//! # Quiz Auto Solve
//!
//! 一个自动答题的 Rust 服务：接收起始链接，渲染题目页面、识别题型、
//! 调用对应解题策略生成答案并提交，沿服务端返回的链接一路答到底。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（浏览器、HTTP 客户端、LLM 客户端），只暴露能力
//! - `PageRenderer` - 页面渲染与整页截图
//! - `CompletionService` - LLM 补全能力
//! - `ResourceFetcher` / `DataExtractor` - 资源下载与结构化提取
//! - `SubmissionClient` - 答案提交
//!
//! ### ② 业务能力层（Services + Solvers）
//! - `services/` - 题型分类、答案规范化
//! - `solvers/` - 按题型划分的解题策略（抓取 / API / 文档 / 表格 / 可视化 / 直答）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整处理流程
//! - `QuestionCtx` - 上下文封装（session_id + question_index）
//! - `QuestionFlow` - 流程编排（render → classify → solve → format → submit）
//! - `AttemptController` - 重试、预算检查与降级策略
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session_driver` - 会话驱动器，沿题目链条推进直到结束或预算耗尽
//!
//! 路由层（`routes/`）是独立于四层之外的前门，只做身份校验和转发。

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod routes;
pub mod services;
pub mod solvers;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::Collaborators;
pub use models::question::Question;
pub use models::{Answer, SessionReport};
pub use orchestrator::{run_session, SessionDriver};
pub use workflow::{AttemptController, QuestionCtx, QuestionFlow};
