//! 题型分类器 - 业务能力层
//!
//! 只负责"判断题型"能力，不关心流程
//!
//! ## 分类方式
//! 按配置的规则顺序逐条检查，第一条命中的规则决定题型。
//! 每条规则看两样东西：题目文本里的关键词、页面中发现的资源种类。

use tracing::debug;

use crate::config::Config;
use crate::error::{AppResult, ConfigError};
use crate::models::{Category, Resource, ResourceKind};

/// 一条分类规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierRule {
    Document,
    Api,
    Tabular,
    Visualization,
    Scrape,
}

impl ClassifierRule {
    /// 按配置名解析规则
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "document" => Some(ClassifierRule::Document),
            "api" => Some(ClassifierRule::Api),
            "tabular" => Some(ClassifierRule::Tabular),
            "visualization" => Some(ClassifierRule::Visualization),
            "scrape" => Some(ClassifierRule::Scrape),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClassifierRule::Document => "document",
            ClassifierRule::Api => "api",
            ClassifierRule::Tabular => "tabular",
            ClassifierRule::Visualization => "visualization",
            ClassifierRule::Scrape => "scrape",
        }
    }

    /// 本条规则是否命中
    fn matches(&self, text: &str, resources: &[Resource]) -> bool {
        match self {
            ClassifierRule::Document => {
                resources.iter().any(|r| r.kind.is_document())
                    || contains_any(text, &["download", "file", "pdf"])
            }
            ClassifierRule::Api => {
                resources.iter().any(|r| r.kind == ResourceKind::Api)
                    || contains_any(text, &["api", "endpoint"])
            }
            ClassifierRule::Tabular => contains_any(
                text,
                &["sum", "calculate", "table", "average", "mean", "total"],
            ),
            ClassifierRule::Visualization => {
                contains_any(text, &["visualize", "chart", "plot", "graph"])
            }
            ClassifierRule::Scrape => contains_any(text, &["scrape", "website", "web page"]),
        }
    }

    /// 命中后对应的题型
    fn category(&self) -> Category {
        match self {
            ClassifierRule::Document => Category::Document,
            ClassifierRule::Api => Category::ApiFetch,
            ClassifierRule::Tabular => Category::TabularAnalysis,
            ClassifierRule::Visualization => Category::Visualization,
            ClassifierRule::Scrape => Category::Scrape,
        }
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

/// 题型分类器
///
/// 职责：
/// - 对单个题目判定题型
/// - 规则顺序可配置，同一输入永远给出同一结果
/// - 不出现 Question，只看文本和资源
/// - 不关心流程顺序
#[derive(Debug)]
pub struct TypeClassifier {
    rules: Vec<ClassifierRule>,
}

impl TypeClassifier {
    /// 按配置的规则名列表创建分类器
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::from_names(&config.classifier_rules)
    }

    /// 按规则名列表创建分类器，未知规则名报配置错误
    pub fn from_names(names: &[String]) -> AppResult<Self> {
        let mut rules = Vec::with_capacity(names.len());
        for name in names {
            let rule = ClassifierRule::from_name(name).ok_or_else(|| ConfigError::UnknownRule {
                name: name.clone(),
            })?;
            rules.push(rule);
        }
        Ok(Self { rules })
    }

    /// 判定题型
    ///
    /// # 参数
    /// - `text`: 题目可见文本
    /// - `resources`: 页面中发现的数据资源
    ///
    /// # 返回
    /// 空文本返回 `Unknown`，没有规则命中返回 `DirectPrompt`，
    /// 两者都由直接提问策略兜底处理
    pub fn classify(&self, text: &str, resources: &[Resource]) -> Category {
        if text.trim().is_empty() {
            debug!("题目文本为空，题型标记为 unknown");
            return Category::Unknown;
        }

        let lower = text.to_lowercase();
        for rule in &self.rules {
            if rule.matches(&lower, resources) {
                let category = rule.category();
                debug!("规则 {} 命中，题型: {}", rule.name(), category);
                return category;
            }
        }

        debug!("没有规则命中，题型: direct-prompt");
        Category::DirectPrompt
    }
}

impl Default for TypeClassifier {
    fn default() -> Self {
        Self {
            rules: vec![
                ClassifierRule::Document,
                ClassifierRule::Api,
                ClassifierRule::Tabular,
                ClassifierRule::Visualization,
                ClassifierRule::Scrape,
            ],
        }
    }
}
