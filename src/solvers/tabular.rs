//! 表格计算策略
//!
//! 题目要求对页面里的表格做数值计算。先尝试在进程内直接算
//! （sum / mean / count / max / min），题目里引号包裹的列名
//! 限定计算范围。算不出来的交给 LLM，附上表格预览。

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::{Collaborators, DataTable, ExtractedData, FormatHint};
use crate::models::{Question, RawAnswer};
use crate::solvers::{SolverStrategy, MAX_CONTEXT_CHARS};
use crate::utils::truncate_text;

/// LLM 兜底时给的表格预览行数
const PREVIEW_ROWS: usize = 5;

pub struct TabularSolver;

#[async_trait]
impl SolverStrategy for TabularSolver {
    fn name(&self) -> &'static str {
        "tabular-analysis"
    }

    async fn solve(&self, question: &Question, collab: &Collaborators) -> AppResult<RawAnswer> {
        let table = match collab
            .extractor
            .extract(question.html.as_bytes(), FormatHint::HtmlTable)
        {
            Ok(ExtractedData::Table(table)) => table,
            _ => return Err(AppError::solve_no_resource("表格")),
        };

        debug!(
            "页面表格: {} 列 x {} 行",
            table.headers.len(),
            table.rows.len()
        );

        if let Some(n) = analyze_table(&table, &question.text) {
            debug!("进程内计算得到答案: {}", n);
            return Ok(RawAnswer::Number(n));
        }

        // 识别不出操作，带上表格预览交给 LLM
        let context = format!(
            "Table: {} columns x {} rows\nColumns: {}\nFirst few rows:\n{}",
            table.headers.len(),
            table.rows.len(),
            table.headers.join(", "),
            table.preview(PREVIEW_ROWS)
        );
        let context = truncate_text(&context, MAX_CONTEXT_CHARS);

        let reply = collab
            .completion
            .complete(&question.text, Some(&context))
            .await?;
        Ok(RawAnswer::Text(reply))
    }
}

/// 按题目文本对表格做数值计算
///
/// 操作关键词按 sum、mean/average、count、max、min 的顺序检查，
/// 第一个命中的生效。列名用题目里双引号包裹的词匹配，没有
/// 列名（或列不存在）时对全表数值单元格计算，count 始终数行数。
/// 识别不出操作时返回 `None`，由调用方交给 LLM。
pub fn analyze_table(table: &DataTable, question_text: &str) -> Option<f64> {
    let lower = question_text.to_lowercase();

    let op = if lower.contains("sum") {
        Op::Sum
    } else if lower.contains("mean") || lower.contains("average") {
        Op::Mean
    } else if lower.contains("count") {
        Op::Count
    } else if lower.contains("max") {
        Op::Max
    } else if lower.contains("min") {
        Op::Min
    } else {
        return None;
    };

    if op == Op::Count {
        return Some(table.rows.len() as f64);
    }

    let values = numeric_values(table, quoted_column(question_text, table));
    if values.is_empty() {
        return None;
    }

    let result = match op {
        Op::Sum => values.iter().sum(),
        Op::Mean => values.iter().sum::<f64>() / values.len() as f64,
        Op::Max => values.iter().cloned().fold(f64::MIN, f64::max),
        Op::Min => values.iter().cloned().fold(f64::MAX, f64::min),
        Op::Count => unreachable!(),
    };

    Some(result)
}

#[derive(PartialEq)]
enum Op {
    Sum,
    Mean,
    Count,
    Max,
    Min,
}

/// 题目里双引号包裹的列名对应的列索引
fn quoted_column(question_text: &str, table: &DataTable) -> Option<usize> {
    let quote_re = Regex::new(r#""([^"]+)""#).ok()?;
    let name = quote_re.captures(question_text)?.get(1)?.as_str();
    table.find_column(name)
}

/// 收集数值单元格，跳过解析不了的
fn numeric_values(table: &DataTable, column: Option<usize>) -> Vec<f64> {
    let mut values = Vec::new();
    for row in &table.rows {
        match column {
            Some(idx) => {
                if let Some(cell) = row.get(idx) {
                    if let Ok(n) = cell.trim().parse::<f64>() {
                        values.push(n);
                    }
                }
            }
            None => {
                for cell in row {
                    if let Ok(n) = cell.trim().parse::<f64>() {
                        values.push(n);
                    }
                }
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales_table() -> DataTable {
        DataTable {
            headers: vec!["month".to_string(), "sales".to_string(), "cost".to_string()],
            rows: vec![
                vec!["Jan".to_string(), "10".to_string(), "4".to_string()],
                vec!["Feb".to_string(), "20".to_string(), "6".to_string()],
                vec!["Mar".to_string(), "30".to_string(), "8".to_string()],
            ],
        }
    }

    #[test]
    fn test_sum_of_quoted_column() {
        let table = sales_table();

        let result = analyze_table(&table, r#"What is the sum of the "sales" column?"#);
        assert_eq!(result, Some(60.0));
    }

    #[test]
    fn test_sum_without_column_uses_all_cells() {
        let table = sales_table();

        // 文本列解析不了会被跳过，只剩数值单元格
        let result = analyze_table(&table, "Calculate the sum of the table");
        assert_eq!(result, Some(78.0));
    }

    #[test]
    fn test_mean_of_column() {
        let table = sales_table();

        let result = analyze_table(&table, r#"What is the average of "cost"?"#);
        assert_eq!(result, Some(6.0));
    }

    #[test]
    fn test_count_is_row_count() {
        let table = sales_table();

        let result = analyze_table(&table, "Count the rows in the table");
        assert_eq!(result, Some(3.0));
    }

    #[test]
    fn test_max_and_min() {
        let table = sales_table();

        assert_eq!(
            analyze_table(&table, r#"What is the max of "sales"?"#),
            Some(30.0)
        );
        assert_eq!(
            analyze_table(&table, r#"What is the min of "cost"?"#),
            Some(4.0)
        );
    }

    #[test]
    fn test_unknown_operation_returns_none() {
        let table = sales_table();

        assert_eq!(analyze_table(&table, "Describe the table"), None);
    }

    #[test]
    fn test_no_numeric_cells_returns_none() {
        let table = DataTable {
            headers: vec!["name".to_string()],
            rows: vec![vec!["alice".to_string()], vec!["bob".to_string()]],
        };

        assert_eq!(analyze_table(&table, "sum the values"), None);
    }

    #[test]
    fn test_unknown_quoted_column_falls_back_to_all_cells() {
        let table = sales_table();

        let result = analyze_table(&table, r#"Sum the "revenue" column"#);
        assert_eq!(result, Some(78.0));
    }
}
