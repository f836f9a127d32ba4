//! 题目数据模型
//!
//! `Question` 由渲染后的页面构建：从可见文本中提取数据资源链接，
//! 从 HTML 中提取提交端点，题型由分类器判定后写入，整个生命周期
//! 内只分类一次。

use std::collections::HashSet;
use std::fmt;

use regex::Regex;

use crate::error::AppResult;
use crate::models::answer::AnswerKind;

/// 渲染后的页面内容
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    /// 完整 HTML
    pub html: String,
    /// 可见文本（document.body.innerText）
    pub text: String,
}

/// 题型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// 需要抓取其他网页内容
    Scrape,
    /// 需要调用 API 接口取数
    ApiFetch,
    /// 需要下载并解析文档（CSV / JSON / PDF 等）
    Document,
    /// 需要对页面内表格做数值计算
    TabularAnalysis,
    /// 需要提交图表类答案
    Visualization,
    /// 直接把题目文本交给 LLM
    DirectPrompt,
    /// 无法判定
    Unknown,
}

impl Category {
    /// 该题型接受的答案类型
    pub fn expected_kinds(&self) -> &'static [AnswerKind] {
        match self {
            Category::TabularAnalysis => &[AnswerKind::Number],
            Category::Visualization => &[AnswerKind::FileBlob],
            _ => &[
                AnswerKind::Number,
                AnswerKind::Text,
                AnswerKind::Boolean,
                AnswerKind::Structured,
            ],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Scrape => "scrape",
            Category::ApiFetch => "api-fetch",
            Category::Document => "document",
            Category::TabularAnalysis => "tabular-analysis",
            Category::Visualization => "visualization",
            Category::DirectPrompt => "direct-prompt",
            Category::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

/// 数据资源的种类（按 URL 粗分）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Csv,
    Json,
    Pdf,
    Excel,
    Api,
    Image,
    /// 普通网页链接
    Page,
}

impl ResourceKind {
    /// 根据 URL 的扩展名和关键词判断资源种类
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_lowercase();
        if lower.contains(".csv") {
            ResourceKind::Csv
        } else if lower.contains(".json") {
            ResourceKind::Json
        } else if lower.contains(".pdf") {
            ResourceKind::Pdf
        } else if lower.contains(".xlsx") || lower.contains(".xls") {
            ResourceKind::Excel
        } else if lower.contains("api") || lower.contains("endpoint") {
            ResourceKind::Api
        } else if [".png", ".jpg", ".jpeg", ".gif", ".svg"]
            .iter()
            .any(|ext| lower.contains(ext))
        {
            ResourceKind::Image
        } else {
            ResourceKind::Page
        }
    }

    /// 是否为可下载解析的文档类资源
    pub fn is_document(&self) -> bool {
        matches!(
            self,
            ResourceKind::Csv | ResourceKind::Json | ResourceKind::Pdf | ResourceKind::Excel
        )
    }
}

/// 题目页面引用的一个数据资源
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub url: String,
    pub kind: ResourceKind,
}

/// 一道题目
#[derive(Debug, Clone)]
pub struct Question {
    /// 题目页面地址
    pub url: String,
    /// 页面可见文本
    pub text: String,
    /// 页面完整 HTML
    pub html: String,
    /// 页面中引用的数据资源（不含提交端点）
    pub resources: Vec<Resource>,
    /// 答案提交端点
    pub submit_url: Option<String>,
    /// 题型（由分类器判定，判定后不再变化）
    pub category: Category,
}

impl Question {
    /// 从渲染后的页面构建题目
    ///
    /// 提交端点优先从 HTML 中提取，找不到时退回可见文本；
    /// 提交端点本身不会出现在 `resources` 中。
    pub fn from_rendered(url: &str, page: &RenderedPage) -> AppResult<Self> {
        let submit_re = Regex::new(r#"https?://[^\s<>"')]+/submit[^\s<>"')]*"#)?;
        let submit_url = submit_re
            .find(&page.html)
            .or_else(|| submit_re.find(&page.text))
            .map(|m| m.as_str().to_string());

        let url_re = Regex::new(r#"https?://[^\s<>"')]+"#)?;
        let mut seen = HashSet::new();
        let mut resources = Vec::new();
        for m in url_re.find_iter(&page.text) {
            let found = m.as_str();
            if found.contains("/submit") {
                continue;
            }
            if !seen.insert(found.to_string()) {
                continue;
            }
            resources.push(Resource {
                url: found.to_string(),
                kind: ResourceKind::from_url(found),
            });
        }

        Ok(Self {
            url: url.to_string(),
            text: page.text.clone(),
            html: page.html.clone(),
            resources,
            submit_url,
            category: Category::Unknown,
        })
    }

    /// 查找第一个指定种类的资源
    pub fn find_resource(&self, kind: ResourceKind) -> Option<&Resource> {
        self.resources.iter().find(|r| r.kind == kind)
    }

    /// 查找第一个文档类资源
    pub fn find_document(&self) -> Option<&Resource> {
        self.resources.iter().find(|r| r.kind.is_document())
    }

    /// 是否存在指定种类的资源
    pub fn has_resource(&self, kind: ResourceKind) -> bool {
        self.find_resource(kind).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(html: &str, text: &str) -> RenderedPage {
        RenderedPage {
            html: html.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_from_rendered_extracts_submit_url_from_html() {
        let p = page(
            r#"<p>Post your answer to <a href="https://quiz.example.com/api/submit?id=3">here</a></p>"#,
            "Post your answer here",
        );
        let q = Question::from_rendered("https://quiz.example.com/q3", &p).unwrap();
        assert_eq!(
            q.submit_url.as_deref(),
            Some("https://quiz.example.com/api/submit?id=3")
        );
    }

    #[test]
    fn test_submit_url_falls_back_to_text() {
        let p = page(
            "<p>no links in markup</p>",
            "Send a POST to https://quiz.example.com/submit when done",
        );
        let q = Question::from_rendered("https://quiz.example.com/q1", &p).unwrap();
        assert_eq!(
            q.submit_url.as_deref(),
            Some("https://quiz.example.com/submit")
        );
    }

    #[test]
    fn test_submit_endpoint_excluded_from_resources() {
        let p = page(
            "",
            "Download https://data.example.com/sales.csv then POST to https://quiz.example.com/submit",
        );
        let q = Question::from_rendered("https://quiz.example.com/q2", &p).unwrap();
        assert_eq!(q.resources.len(), 1);
        assert_eq!(q.resources[0].url, "https://data.example.com/sales.csv");
        assert_eq!(q.resources[0].kind, ResourceKind::Csv);
    }

    #[test]
    fn test_duplicate_urls_deduplicated() {
        let p = page(
            "",
            "See https://data.example.com/a.json and again https://data.example.com/a.json",
        );
        let q = Question::from_rendered("https://quiz.example.com/q4", &p).unwrap();
        assert_eq!(q.resources.len(), 1);
    }

    #[test]
    fn test_resource_kind_from_url() {
        assert_eq!(ResourceKind::from_url("https://x.com/d.csv"), ResourceKind::Csv);
        assert_eq!(ResourceKind::from_url("https://x.com/d.json?v=1"), ResourceKind::Json);
        assert_eq!(ResourceKind::from_url("https://x.com/report.pdf"), ResourceKind::Pdf);
        assert_eq!(ResourceKind::from_url("https://x.com/book.xlsx"), ResourceKind::Excel);
        assert_eq!(ResourceKind::from_url("https://x.com/api/v1/users"), ResourceKind::Api);
        assert_eq!(ResourceKind::from_url("https://x.com/chart.png"), ResourceKind::Image);
        assert_eq!(ResourceKind::from_url("https://x.com/about"), ResourceKind::Page);
    }

    #[test]
    fn test_expected_kinds_per_category() {
        assert_eq!(
            Category::TabularAnalysis.expected_kinds(),
            &[AnswerKind::Number]
        );
        assert_eq!(
            Category::Visualization.expected_kinds(),
            &[AnswerKind::FileBlob]
        );
        assert!(Category::DirectPrompt
            .expected_kinds()
            .contains(&AnswerKind::Text));
        assert!(!Category::DirectPrompt
            .expected_kinds()
            .contains(&AnswerKind::FileBlob));
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(Category::ApiFetch.to_string(), "api-fetch");
        assert_eq!(Category::TabularAnalysis.to_string(), "tabular-analysis");
    }
}
