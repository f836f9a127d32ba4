//! 答案格式化器 - 业务能力层
//!
//! 把策略产出的原始答案整理成平台接受的提交形态
//!
//! ## 整理规则
//! - 纯数字文本提升为数字答案
//! - true/false/yes/no 提升为布尔答案
//! - 数值计算题强制要求数字，从文本中提取第一个数字
//! - 最后按题型校验答案类型，不匹配直接报错，不提交碰运气

use regex::Regex;

use crate::error::{AppResult, FormattingError};
use crate::models::{Answer, Category, RawAnswer};
use crate::utils::truncate_text;

/// 答案格式化器
///
/// 职责：
/// - 原始答案到提交答案的类型提升
/// - 按题型校验答案类型
/// - 不认识 Question / Session
/// - 不关心流程顺序
pub struct AnswerFormatter;

impl AnswerFormatter {
    /// 格式化答案
    ///
    /// # 参数
    /// - `raw`: 策略产出的原始答案
    /// - `category`: 题型，决定类型提升和校验规则
    pub fn format(&self, raw: RawAnswer, category: Category) -> AppResult<Answer> {
        let answer = match raw {
            RawAnswer::Number(n) => Answer::Number(n),
            RawAnswer::Bool(b) => Answer::Boolean(b),
            RawAnswer::Structured(value) => Answer::Structured(value),
            RawAnswer::Binary { data, mime } => Answer::file_blob(&data, &mime),
            RawAnswer::Text(text) => self.promote_text(&text, category)?,
        };

        let kind = answer.kind();
        if !category.expected_kinds().contains(&kind) {
            return Err(FormattingError::KindMismatch {
                category: category.to_string(),
                kind: kind.to_string(),
            }
            .into());
        }

        Ok(answer)
    }

    /// 文本答案的类型提升
    fn promote_text(&self, text: &str, category: Category) -> AppResult<Answer> {
        let trimmed = text.trim();

        // 整段就是一个数字
        let numeric_re = Regex::new(r"^-?\d+\.?\d*$")?;
        if numeric_re.is_match(trimmed) {
            if let Ok(n) = trimmed.parse::<f64>() {
                return Ok(Answer::Number(n));
            }
        }

        // 布尔答案的常见写法
        if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("yes") {
            return Ok(Answer::Boolean(true));
        }
        if trimmed.eq_ignore_ascii_case("false") || trimmed.eq_ignore_ascii_case("no") {
            return Ok(Answer::Boolean(false));
        }

        // 数值计算题必须给数字，LLM 多说的话里挑第一个数字
        if category == Category::TabularAnalysis {
            let number_re = Regex::new(r"-?\d+\.?\d*")?;
            if let Some(m) = number_re.find(trimmed) {
                if let Ok(n) = m.as_str().parse::<f64>() {
                    return Ok(Answer::Number(n));
                }
            }
            return Err(FormattingError::NotNumeric {
                text: truncate_text(trimmed, 80),
            }
            .into());
        }

        Ok(Answer::Text(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_numeric_text_promoted_to_number() {
        let formatter = AnswerFormatter;

        let answer = formatter
            .format(
                RawAnswer::Text("1234.5".to_string()),
                Category::DirectPrompt,
            )
            .unwrap();
        assert_eq!(answer, Answer::Number(1234.5));

        let answer = formatter
            .format(RawAnswer::Text("-42".to_string()), Category::DirectPrompt)
            .unwrap();
        assert_eq!(answer, Answer::Number(-42.0));
    }

    #[test]
    fn test_boolean_text_promoted() {
        let formatter = AnswerFormatter;

        for (text, expected) in [("true", true), ("Yes", true), ("FALSE", false), ("no", false)] {
            let answer = formatter
                .format(RawAnswer::Text(text.to_string()), Category::DirectPrompt)
                .unwrap();
            assert_eq!(answer, Answer::Boolean(expected));
        }
    }

    #[test]
    fn test_plain_text_stays_text() {
        let formatter = AnswerFormatter;

        let answer = formatter
            .format(
                RawAnswer::Text("  Paris  ".to_string()),
                Category::DirectPrompt,
            )
            .unwrap();
        assert_eq!(answer, Answer::Text("Paris".to_string()));
    }

    #[test]
    fn test_tabular_extracts_first_number() {
        let formatter = AnswerFormatter;

        let answer = formatter
            .format(
                RawAnswer::Text("The sum of the column is 1234.5 dollars".to_string()),
                Category::TabularAnalysis,
            )
            .unwrap();
        assert_eq!(answer, Answer::Number(1234.5));
    }

    #[test]
    fn test_tabular_without_number_is_error() {
        let formatter = AnswerFormatter;

        let err = formatter
            .format(
                RawAnswer::Text("I could not compute it".to_string()),
                Category::TabularAnalysis,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Formatting(FormattingError::NotNumeric { .. })
        ));
    }

    #[test]
    fn test_visualization_requires_file_blob() {
        let formatter = AnswerFormatter;

        // 文本答案对图表题无效
        let err = formatter
            .format(
                RawAnswer::Text("here is a description of the chart".to_string()),
                Category::Visualization,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Formatting(FormattingError::KindMismatch { .. })
        ));

        // 截图字节才是合法答案
        let answer = formatter
            .format(
                RawAnswer::Binary {
                    data: vec![0x89, 0x50, 0x4e, 0x47],
                    mime: "image/png".to_string(),
                },
                Category::Visualization,
            )
            .unwrap();
        assert_eq!(answer.kind().to_string(), "file-blob");
    }

    #[test]
    fn test_tabular_rejects_boolean() {
        let formatter = AnswerFormatter;

        let err = formatter
            .format(RawAnswer::Bool(true), Category::TabularAnalysis)
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Formatting(FormattingError::KindMismatch { .. })
        ));
    }
}
