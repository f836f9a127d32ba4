//! 数据提取器 - 基础设施层
//!
//! 把下载到的原始字节解析成结构化数据，供解题策略使用

use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{AppResult, ExtractionError};

/// 数据格式提示
///
/// 调用方按资源 URL 推断格式；拿不准时用 `Auto` 让提取器嗅探
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    Csv,
    Json,
    HtmlTable,
    Pdf,
    /// 按内容嗅探格式
    Auto,
}

/// 表格数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    /// 按列名查找列索引（忽略大小写和首尾空白）
    pub fn find_column(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.headers
            .iter()
            .position(|h| h.trim().to_lowercase() == wanted)
    }

    /// 生成前 n 行的 CSV 预览（含表头），用于喂给 LLM
    pub fn preview(&self, n: usize) -> String {
        let mut lines = Vec::with_capacity(n + 1);
        lines.push(self.headers.join(","));
        for row in self.rows.iter().take(n) {
            lines.push(row.join(","));
        }
        lines.join("\n")
    }
}

/// 提取结果
#[derive(Debug, Clone)]
pub enum ExtractedData {
    /// 表格（CSV、HTML 表格）
    Table(DataTable),
    /// JSON 文档
    Json(JsonValue),
    /// 纯文本（PDF 提取结果、无法结构化的内容）
    Text(String),
}

/// 数据提取能力
///
/// 职责：
/// - 把字节解析为表格 / JSON / 文本
/// - 不认识 Question / Resource
/// - 不做网络 IO
pub trait DataExtractor: Send + Sync {
    /// 按格式提示解析数据
    fn extract(&self, data: &[u8], hint: FormatHint) -> AppResult<ExtractedData>;
}

/// 内置提取器
///
/// CSV / JSON / HTML 表格 / PDF 文本全部在进程内解析，不依赖外部工具
pub struct BuiltinExtractor;

impl DataExtractor for BuiltinExtractor {
    fn extract(&self, data: &[u8], hint: FormatHint) -> AppResult<ExtractedData> {
        match hint {
            FormatHint::Csv => {
                let text = String::from_utf8_lossy(data);
                Ok(ExtractedData::Table(parse_csv(&text)?))
            }
            FormatHint::Json => {
                let value: JsonValue = serde_json::from_slice(data)?;
                Ok(ExtractedData::Json(value))
            }
            FormatHint::HtmlTable => {
                let text = String::from_utf8_lossy(data);
                Ok(ExtractedData::Table(parse_html_table(&text)?))
            }
            FormatHint::Pdf => Ok(ExtractedData::Text(extract_pdf_text(data)?)),
            FormatHint::Auto => self.sniff(data),
        }
    }
}

impl BuiltinExtractor {
    /// 按内容嗅探格式后解析
    fn sniff(&self, data: &[u8]) -> AppResult<ExtractedData> {
        if data.starts_with(b"%PDF") {
            debug!("嗅探到 PDF 格式");
            return self.extract(data, FormatHint::Pdf);
        }

        // ZIP 容器（xlsx 等），没有进程内解析能力
        if data.starts_with(b"PK") {
            return Err(ExtractionError::UnsupportedFormat {
                format: "excel/zip".to_string(),
            }
            .into());
        }

        let text = String::from_utf8_lossy(data);
        let trimmed = text.trim_start();

        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str::<JsonValue>(&text) {
                debug!("嗅探到 JSON 格式");
                return Ok(ExtractedData::Json(value));
            }
        }

        if text.to_lowercase().contains("<table") {
            debug!("嗅探到 HTML 表格");
            return self.extract(data, FormatHint::HtmlTable);
        }

        if text.contains(',') && text.contains('\n') {
            debug!("嗅探到 CSV 格式");
            return self.extract(data, FormatHint::Csv);
        }

        Ok(ExtractedData::Text(text.into_owned()))
    }
}

/// 解析 CSV 文本
///
/// 第一行为表头，支持双引号包裹的字段（含逗号和转义引号 ""）
fn parse_csv(text: &str) -> AppResult<DataTable> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let headers = match lines.next() {
        Some(line) => split_csv_line(line),
        None => {
            return Err(ExtractionError::CorruptData {
                format: "csv".to_string(),
                reason: "内容为空".to_string(),
            }
            .into())
        }
    };

    let rows: Vec<Vec<String>> = lines.map(split_csv_line).collect();

    Ok(DataTable { headers, rows })
}

/// 拆分单行 CSV 字段
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    // "" 是引号内的转义引号
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// 从 HTML 中提取第一个表格
///
/// 第一行作为表头，其余行作为数据
fn parse_html_table(html: &str) -> AppResult<DataTable> {
    let table_re = Regex::new(r"(?is)<table[^>]*>(.*?)</table>")?;
    let row_re = Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>")?;
    let cell_re = Regex::new(r"(?is)<t[hd][^>]*>(.*?)</t[hd]>")?;

    let table_body = table_re
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| ExtractionError::CorruptData {
            format: "html".to_string(),
            reason: "没有找到 <table> 元素".to_string(),
        })?;

    let mut all_rows: Vec<Vec<String>> = Vec::new();
    for row_cap in row_re.captures_iter(table_body) {
        let row_html = match row_cap.get(1) {
            Some(m) => m.as_str(),
            None => continue,
        };

        let cells: Vec<String> = cell_re
            .captures_iter(row_html)
            .filter_map(|cap| cap.get(1))
            .map(|m| strip_html(m.as_str()))
            .collect();

        if !cells.is_empty() {
            all_rows.push(cells);
        }
    }

    if all_rows.is_empty() {
        return Err(ExtractionError::CorruptData {
            format: "html".to_string(),
            reason: "表格中没有数据行".to_string(),
        }
        .into());
    }

    let headers = all_rows.remove(0);
    Ok(DataTable {
        headers,
        rows: all_rows,
    })
}

/// 去掉 HTML 标签并解码常见实体
fn strip_html(html: &str) -> String {
    let text = if let Ok(tag_re) = Regex::new(r"(?is)<[^>]+>") {
        tag_re.replace_all(html, "").into_owned()
    } else {
        html.to_string()
    };

    // &amp; 最后解码，避免 &amp;lt; 被二次解码
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// 从 PDF 字节中提取可读文本
///
/// 扫描 stream 区段中的可打印字符串，没有 stream 时扫描整个文件。
/// 压缩过的内容流提取不到文本，此时报数据损坏。
fn extract_pdf_text(data: &[u8]) -> AppResult<String> {
    let mut text = String::new();

    let mut offset = 0;
    let mut found_stream = false;
    while let Some(start) = find_subsequence(&data[offset..], b"stream") {
        let stream_start = offset + start + b"stream".len();
        let stream_end = match find_subsequence(&data[stream_start..], b"endstream") {
            Some(end) => stream_start + end,
            None => data.len(),
        };

        found_stream = true;
        collect_printable_runs(&data[stream_start..stream_end], &mut text);

        offset = stream_end;
        if offset >= data.len() {
            break;
        }
    }

    if !found_stream {
        collect_printable_runs(data, &mut text);
    }

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ExtractionError::CorruptData {
            format: "pdf".to_string(),
            reason: "没有提取到可读文本（内容流可能已压缩）".to_string(),
        }
        .into());
    }

    Ok(text)
}

/// 收集长度不小于 4 的可打印 ASCII 连续段
fn collect_printable_runs(data: &[u8], out: &mut String) {
    let mut run = String::new();
    for &b in data {
        if (0x20..=0x7e).contains(&b) {
            run.push(b as char);
        } else {
            if run.trim().len() >= 4 {
                out.push_str(run.trim());
                out.push('\n');
            }
            run.clear();
        }
    }
    if run.trim().len() >= 4 {
        out.push_str(run.trim());
        out.push('\n');
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_basic() {
        let table = parse_csv("name,value\nalice,10\nbob,20\n").unwrap();

        assert_eq!(table.headers, vec!["name", "value"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["alice", "10"]);
    }

    #[test]
    fn test_parse_csv_quoted_fields() {
        let table = parse_csv("name,note\n\"Smith, John\",\"said \"\"hi\"\"\"\n").unwrap();

        assert_eq!(table.rows[0][0], "Smith, John");
        assert_eq!(table.rows[0][1], "said \"hi\"");
    }

    #[test]
    fn test_parse_html_table() {
        let html = r#"
            <html><body>
            <table>
              <tr><th>item</th><th>price</th></tr>
              <tr><td>apple</td><td>3</td></tr>
              <tr><td>pear &amp; plum</td><td>5</td></tr>
            </table>
            </body></html>
        "#;

        let table = parse_html_table(html).unwrap();
        assert_eq!(table.headers, vec!["item", "price"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][0], "pear & plum");
    }

    #[test]
    fn test_find_column_case_insensitive() {
        let table = DataTable {
            headers: vec!["Name".to_string(), " Value ".to_string()],
            rows: vec![],
        };

        assert_eq!(table.find_column("name"), Some(0));
        assert_eq!(table.find_column("value"), Some(1));
        assert_eq!(table.find_column("missing"), None);
    }

    #[test]
    fn test_preview_limits_rows() {
        let table = DataTable {
            headers: vec!["v".to_string()],
            rows: (0..50).map(|i| vec![i.to_string()]).collect(),
        };

        let preview = table.preview(10);
        assert_eq!(preview.lines().count(), 11);
        assert!(preview.starts_with("v\n0"));
    }

    #[test]
    fn test_sniff_json() {
        let extractor = BuiltinExtractor;
        let data = br#"{"answer": 42}"#;

        match extractor.extract(data, FormatHint::Auto).unwrap() {
            ExtractedData::Json(value) => assert_eq!(value["answer"], 42),
            other => panic!("期望 JSON，得到 {:?}", other),
        }
    }

    #[test]
    fn test_sniff_csv() {
        let extractor = BuiltinExtractor;
        let data = b"a,b\n1,2\n";

        match extractor.extract(data, FormatHint::Auto).unwrap() {
            ExtractedData::Table(table) => assert_eq!(table.headers, vec!["a", "b"]),
            other => panic!("期望表格，得到 {:?}", other),
        }
    }

    #[test]
    fn test_sniff_zip_unsupported() {
        let extractor = BuiltinExtractor;
        let data = b"PK\x03\x04xxxx";

        let err = extractor.extract(data, FormatHint::Auto).unwrap_err();
        assert!(err.to_string().contains("不支持"));
    }

    #[test]
    fn test_extract_pdf_text_from_stream() {
        let data = b"%PDF-1.4\nstream\nBT (Total revenue: 1234) Tj ET\nendstream\n";

        let text = extract_pdf_text(data).unwrap();
        assert!(text.contains("Total revenue: 1234"));
    }

    #[test]
    fn test_extract_pdf_text_empty_is_error() {
        let data = b"%PDF-1.4\nstream\n\x01\x02\x03\nendstream\n";

        assert!(extract_pdf_text(data).is_err());
    }
}
