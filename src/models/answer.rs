//! 答案数据模型
//!
//! 策略产出 `RawAnswer`，格式化器把它规范化为 `Answer`，
//! 提交时再由 `to_submission_value` 转成线上格式。

use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::utils::truncate_text;

/// f64 能精确表示的最大整数（2^53）
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// 解题策略的原始产出
#[derive(Debug, Clone)]
pub enum RawAnswer {
    Text(String),
    Number(f64),
    Bool(bool),
    /// 二进制内容（如截图）
    Binary { data: Vec<u8>, mime: String },
    Structured(JsonValue),
}

/// 答案类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    Number,
    Text,
    Boolean,
    FileBlob,
    Structured,
}

impl fmt::Display for AnswerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AnswerKind::Number => "number",
            AnswerKind::Text => "text",
            AnswerKind::Boolean => "boolean",
            AnswerKind::FileBlob => "file-blob",
            AnswerKind::Structured => "structured",
        };
        write!(f, "{}", label)
    }
}

/// 规范化后的答案
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Answer {
    Number(f64),
    Text(String),
    Boolean(bool),
    FileBlob { data: String, mime: String },
    Structured(JsonValue),
}

impl Answer {
    /// 用 base64 封装二进制内容
    pub fn file_blob(data: &[u8], mime: impl Into<String>) -> Self {
        Answer::FileBlob {
            data: general_purpose::STANDARD.encode(data),
            mime: mime.into(),
        }
    }

    pub fn kind(&self) -> AnswerKind {
        match self {
            Answer::Number(_) => AnswerKind::Number,
            Answer::Text(_) => AnswerKind::Text,
            Answer::Boolean(_) => AnswerKind::Boolean,
            Answer::FileBlob { .. } => AnswerKind::FileBlob,
            Answer::Structured(_) => AnswerKind::Structured,
        }
    }

    /// 转成提交端点期望的 JSON 值
    ///
    /// 整数值的数字按 JSON 整数提交，文件按 data URI 提交。
    pub fn to_submission_value(&self) -> JsonValue {
        match self {
            Answer::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_EXACT_INT {
                    json!(*n as i64)
                } else {
                    json!(n)
                }
            }
            Answer::Text(s) => json!(s),
            Answer::Boolean(b) => json!(b),
            Answer::FileBlob { data, mime } => json!(format!("data:{};base64,{}", mime, data)),
            Answer::Structured(v) => v.clone(),
        }
    }

    /// 日志用的简短预览
    pub fn preview(&self) -> String {
        match self {
            Answer::Number(n) => n.to_string(),
            Answer::Text(s) => truncate_text(s, 80),
            Answer::Boolean(b) => b.to_string(),
            Answer::FileBlob { data, mime } => {
                format!("<{} 文件, base64 {} 字符>", mime, data.len())
            }
            Answer::Structured(v) => truncate_text(&v.to_string(), 80),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_number_submitted_as_int() {
        assert_eq!(Answer::Number(42.0).to_submission_value(), json!(42));
        assert_eq!(Answer::Number(-7.0).to_submission_value(), json!(-7));
    }

    #[test]
    fn test_fractional_number_submitted_as_float() {
        assert_eq!(Answer::Number(3.25).to_submission_value(), json!(3.25));
    }

    #[test]
    fn test_file_blob_submitted_as_data_uri() {
        let answer = Answer::file_blob(b"png-bytes", "image/png");
        let value = answer.to_submission_value();
        let s = value.as_str().unwrap();
        assert!(s.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_serde_shape() {
        let value = serde_json::to_value(Answer::Number(5.0)).unwrap();
        assert_eq!(value["kind"], "number");
        assert_eq!(value["payload"], 5.0);

        let value = serde_json::to_value(Answer::file_blob(b"x", "image/png")).unwrap();
        assert_eq!(value["kind"], "file_blob");
        assert_eq!(value["payload"]["mime"], "image/png");
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(Answer::Boolean(true).kind(), AnswerKind::Boolean);
        assert_eq!(
            Answer::Structured(json!({"a": 1})).kind(),
            AnswerKind::Structured
        );
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let answer = Answer::Text("x".repeat(200));
        assert!(answer.preview().chars().count() < 100);
    }
}
