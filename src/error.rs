use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 页面渲染错误
    Render(RenderError),
    /// LLM 补全服务错误
    Completion(CompletionError),
    /// 资源下载错误
    Fetch(FetchError),
    /// 数据解析错误
    Extraction(ExtractionError),
    /// 解题策略错误
    Solve(SolveError),
    /// 答案格式化错误
    Formatting(FormattingError),
    /// 配置错误
    Config(ConfigError),
    /// 会话时间预算耗尽
    BudgetExceeded { elapsed_secs: u64, budget_secs: u64 },
    /// 单题重试次数耗尽
    RetriesExhausted { question_url: String, attempts: u32 },
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Render(e) => write!(f, "渲染错误: {}", e),
            AppError::Completion(e) => write!(f, "LLM错误: {}", e),
            AppError::Fetch(e) => write!(f, "下载错误: {}", e),
            AppError::Extraction(e) => write!(f, "解析错误: {}", e),
            AppError::Solve(e) => write!(f, "解题错误: {}", e),
            AppError::Formatting(e) => write!(f, "格式化错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::BudgetExceeded {
                elapsed_secs,
                budget_secs,
            } => {
                write!(
                    f,
                    "会话时间预算已耗尽 (已用 {}s / 预算 {}s)",
                    elapsed_secs, budget_secs
                )
            }
            AppError::RetriesExhausted {
                question_url,
                attempts,
            } => {
                write!(
                    f,
                    "题目重试次数已耗尽 ({}, 共尝试 {} 次)",
                    question_url, attempts
                )
            }
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Render(e) => Some(e),
            AppError::Completion(e) => Some(e),
            AppError::Fetch(e) => Some(e),
            AppError::Extraction(e) => Some(e),
            AppError::Solve(e) => Some(e),
            AppError::Formatting(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::BudgetExceeded { .. }
            | AppError::RetriesExhausted { .. }
            | AppError::Other(_) => None,
        }
    }
}

/// 页面渲染错误
#[derive(Debug)]
pub enum RenderError {
    /// 启动浏览器失败
    LaunchFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 创建页面失败
    PageCreationFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航失败
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 导航超时
    Timeout { url: String },
    /// 提取页面内容失败
    ContentExtractionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 截图失败
    ScreenshotFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::LaunchFailed { source } => {
                write!(f, "启动浏览器失败: {}", source)
            }
            RenderError::PageCreationFailed { source } => {
                write!(f, "创建页面失败: {}", source)
            }
            RenderError::NavigationFailed { url, source } => {
                write!(f, "导航到 {} 失败: {}", url, source)
            }
            RenderError::Timeout { url } => {
                write!(f, "导航到 {} 超时", url)
            }
            RenderError::ContentExtractionFailed { source } => {
                write!(f, "提取页面内容失败: {}", source)
            }
            RenderError::ScreenshotFailed { url, source } => {
                write!(f, "截图 {} 失败: {}", url, source)
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::LaunchFailed { source }
            | RenderError::PageCreationFailed { source }
            | RenderError::NavigationFailed { source, .. }
            | RenderError::ContentExtractionFailed { source }
            | RenderError::ScreenshotFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            RenderError::Timeout { .. } => None,
        }
    }
}

/// LLM 补全服务错误
#[derive(Debug)]
pub enum CompletionError {
    /// API 调用失败
    RequestFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    EmptyResponse { model: String },
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::RequestFailed { model, source } => {
                write!(f, "LLM API调用失败 (模型: {}): {}", model, source)
            }
            CompletionError::EmptyResponse { model } => {
                write!(f, "LLM返回内容为空 (模型: {})", model)
            }
        }
    }
}

impl std::error::Error for CompletionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompletionError::RequestFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            CompletionError::EmptyResponse { .. } => None,
        }
    }
}

/// 资源下载错误
#[derive(Debug)]
pub enum FetchError {
    /// 网络请求失败
    RequestFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回错误状态码
    BadStatus { url: String, status: u16 },
    /// 读取响应体失败
    BodyReadFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// HTTP 客户端初始化失败
    ClientBuildFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::RequestFailed { url, source } => {
                write!(f, "请求失败 ({}): {}", url, source)
            }
            FetchError::BadStatus { url, status } => {
                write!(f, "请求返回错误状态 ({}): {}", url, status)
            }
            FetchError::BodyReadFailed { url, source } => {
                write!(f, "读取响应体失败 ({}): {}", url, source)
            }
            FetchError::ClientBuildFailed { source } => {
                write!(f, "HTTP客户端初始化失败: {}", source)
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::RequestFailed { source, .. }
            | FetchError::BodyReadFailed { source, .. }
            | FetchError::ClientBuildFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            FetchError::BadStatus { .. } => None,
        }
    }
}

/// 数据解析错误
#[derive(Debug)]
pub enum ExtractionError {
    /// 不支持的数据格式
    UnsupportedFormat { format: String },
    /// 数据损坏或无法解析
    CorruptData { format: String, reason: String },
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionError::UnsupportedFormat { format } => {
                write!(f, "不支持的数据格式: {}", format)
            }
            ExtractionError::CorruptData { format, reason } => {
                write!(f, "{} 数据无法解析: {}", format, reason)
            }
        }
    }
}

impl std::error::Error for ExtractionError {}

/// 解题策略错误
#[derive(Debug)]
pub enum SolveError {
    /// 页面中没有找到策略需要的资源
    NoResource { wanted: String },
    /// 页面中没有找到提交端点
    MissingSubmitEndpoint { page_url: String },
    /// 策略产出了空答案
    EmptyAnswer { strategy: String },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::NoResource { wanted } => {
                write!(f, "页面中没有找到{}资源", wanted)
            }
            SolveError::MissingSubmitEndpoint { page_url } => {
                write!(f, "页面中没有找到提交端点: {}", page_url)
            }
            SolveError::EmptyAnswer { strategy } => {
                write!(f, "策略 {} 产出了空答案", strategy)
            }
        }
    }
}

impl std::error::Error for SolveError {}

/// 答案格式化错误
#[derive(Debug)]
pub enum FormattingError {
    /// 答案类型与题型不匹配
    KindMismatch { category: String, kind: String },
    /// 期望数字但文本中没有数字
    NotNumeric { text: String },
}

impl fmt::Display for FormattingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormattingError::KindMismatch { category, kind } => {
                write!(f, "题型 {} 不接受 {} 类型的答案", category, kind)
            }
            FormattingError::NotNumeric { text } => {
                write!(f, "期望数字答案，但文本中没有数字: {}", text)
            }
        }
    }
}

impl std::error::Error for FormattingError {}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 必需配置项缺失
    MissingRequired { var_name: String },
    /// 提示词超出平台长度限制
    PromptTooLong {
        var_name: String,
        len: usize,
        max_len: usize,
    },
    /// 未知的分类规则名
    UnknownRule { name: String },
    /// 读取配置文件失败
    FileReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    FileParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired { var_name } => {
                write!(f, "必需的配置项 {} 未设置", var_name)
            }
            ConfigError::PromptTooLong {
                var_name,
                len,
                max_len,
            } => {
                write!(
                    f,
                    "{} 长度为 {} 字符，超出 {} 字符的上限",
                    var_name, len, max_len
                )
            }
            ConfigError::UnknownRule { name } => {
                write!(f, "未知的分类规则名: {}", name)
            }
            ConfigError::FileReadFailed { path, source } => {
                write!(f, "读取配置文件失败 ({}): {}", path, source)
            }
            ConfigError::FileParseFailed { path, source } => {
                write!(f, "TOML解析失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileReadFailed { source, .. }
            | ConfigError::FileParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

// ========== 从子错误类型转换 ==========

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Render(err)
    }
}

impl From<CompletionError> for AppError {
    fn from(err: CompletionError) -> Self {
        AppError::Completion(err)
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::Fetch(err)
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::Extraction(err)
    }
}

impl From<SolveError> for AppError {
    fn from(err: SolveError) -> Self {
        AppError::Solve(err)
    }
}

impl From<FormattingError> for AppError {
    fn from(err: FormattingError) -> Self {
        AppError::Formatting(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Render(RenderError::ContentExtractionFailed {
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Extraction(ExtractionError::CorruptData {
            format: "json".to_string(),
            reason: err.to_string(),
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::FileParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Config(ConfigError::FileReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Other(format!("正则表达式错误: {}", err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建导航失败错误
    pub fn render_navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Render(RenderError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建LLM API调用错误
    pub fn completion_request_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Completion(CompletionError::RequestFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建下载请求失败错误
    pub fn fetch_request_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Fetch(FetchError::RequestFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建资源缺失错误
    pub fn solve_no_resource(wanted: impl Into<String>) -> Self {
        AppError::Solve(SolveError::NoResource {
            wanted: wanted.into(),
        })
    }

    /// 创建预算耗尽错误
    pub fn budget_exceeded(elapsed: std::time::Duration, budget: std::time::Duration) -> Self {
        AppError::BudgetExceeded {
            elapsed_secs: elapsed.as_secs(),
            budget_secs: budget.as_secs(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
