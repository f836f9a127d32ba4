//! 题目处理上下文
//!
//! 封装"我正在处理哪个会话的第几题"这一信息

use std::fmt::Display;

/// 题目处理上下文
///
/// 包含处理单个题目所需的所有上下文信息
#[derive(Debug, Clone)]
pub struct QuestionCtx {
    /// 会话ID（仅用于日志显示）
    pub session_id: String,

    /// 题目在链条中的序号（从1开始）
    pub question_index: usize,

    /// 题目页面地址
    pub url: String,
}

impl QuestionCtx {
    /// 创建新的题目上下文
    pub fn new(session_id: String, question_index: usize, url: String) -> Self {
        Self {
            session_id,
            question_index,
            url,
        }
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[会话 {} 题目#{}]", self.session_id, self.question_index)
    }
}
