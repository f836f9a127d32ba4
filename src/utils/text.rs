//! 文本工具模块

/// 截断长文本用于日志显示和提示词拼接
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate_text("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        // 中文按字符截断，不会把多字节字符切坏
        assert_eq!(truncate_text("数据分析题目", 2), "数据...");
    }
}
