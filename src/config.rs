use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 提示词的平台长度上限（字符数）
pub const MAX_PROMPT_CHARS: usize = 100;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP 服务监听地址
    pub host: String,
    /// HTTP 服务监听端口
    pub port: u16,
    /// 注册邮箱（提交答案时随身份一起发送）
    pub email: String,
    /// 身份校验密钥
    pub secret: String,
    /// 单个会话的时间预算（秒）
    pub session_budget_secs: u64,
    /// 单题最大尝试次数
    pub max_retries: u32,
    /// 两次尝试之间的等待时间（毫秒，默认不等待）
    pub retry_delay_ms: u64,
    /// HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 页面导航超时（秒）
    pub render_timeout_secs: u64,
    /// 导航完成后等待页面脚本的时间（毫秒）
    pub render_settle_ms: u64,
    /// 是否以无头模式启动浏览器
    pub headless: bool,
    /// 浏览器可执行文件路径（不设置则使用 chromiumoxide 的默认查找）
    pub chrome_executable: Option<String>,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 自定义系统提示词（为空则使用内置提示词）
    pub system_prompt: String,
    /// 自定义用户提示词引导语（为空则使用内置引导语）
    pub user_prompt: String,
    /// 题型分类规则的应用顺序
    pub classifier_rules: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            email: String::new(),
            secret: String::new(),
            session_budget_secs: 180,
            max_retries: 3,
            retry_delay_ms: 0,
            request_timeout_secs: 30,
            render_timeout_secs: 30,
            render_settle_ms: 2000,
            headless: true,
            chrome_executable: None,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            system_prompt: String::new(),
            user_prompt: String::new(),
            classifier_rules: default_classifier_rules(),
        }
    }
}

/// 默认的分类规则顺序（先匹配的先生效）
pub fn default_classifier_rules() -> Vec<String> {
    vec![
        "document".to_string(),
        "api".to_string(),
        "tabular".to_string(),
        "visualization".to_string(),
        "scrape".to_string(),
    ]
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(default.host),
            port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.port),
            email: std::env::var("EMAIL").unwrap_or(default.email),
            secret: std::env::var("SECRET").unwrap_or(default.secret),
            session_budget_secs: std::env::var("MAX_QUIZ_TIME_SECONDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.session_budget_secs),
            max_retries: std::env::var("MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_retries),
            retry_delay_ms: std::env::var("RETRY_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retry_delay_ms),
            request_timeout_secs: std::env::var("TIMEOUT_SECONDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            render_timeout_secs: std::env::var("RENDER_TIMEOUT_SECONDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.render_timeout_secs),
            render_settle_ms: std::env::var("RENDER_SETTLE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.render_settle_ms),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok(),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            system_prompt: std::env::var("SYSTEM_PROMPT").unwrap_or(default.system_prompt),
            user_prompt: std::env::var("USER_PROMPT").unwrap_or(default.user_prompt),
            classifier_rules: std::env::var("CLASSIFIER_RULES")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
                .unwrap_or(default.classifier_rules),
        }
    }

    /// 加载完整配置：环境变量 + 可选的 TOML 覆盖文件 + 校验
    ///
    /// TOML 文件路径通过 `QUIZ_CONFIG_PATH` 指定，文件里只允许覆盖
    /// 提示词和分类规则顺序。
    pub fn load() -> AppResult<Self> {
        let mut config = Self::from_env();
        if let Ok(path) = std::env::var("QUIZ_CONFIG_PATH") {
            config.apply_file_overrides(&path)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// 校验必需项和平台规则
    pub fn validate(&self) -> AppResult<()> {
        if self.llm_api_key.is_empty() {
            return Err(ConfigError::MissingRequired {
                var_name: "LLM_API_KEY".to_string(),
            }
            .into());
        }
        if self.secret.is_empty() {
            return Err(ConfigError::MissingRequired {
                var_name: "SECRET".to_string(),
            }
            .into());
        }
        if self.email.is_empty() {
            return Err(ConfigError::MissingRequired {
                var_name: "EMAIL".to_string(),
            }
            .into());
        }
        // 平台规则：自定义提示词不得超过 100 字符
        check_prompt_len("SYSTEM_PROMPT", &self.system_prompt)?;
        check_prompt_len("USER_PROMPT", &self.user_prompt)?;
        Ok(())
    }

    fn apply_file_overrides(&mut self, path: &str) -> AppResult<()> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadFailed {
            path: path.to_string(),
            source: Box::new(e),
        })?;
        let overrides: FileOverrides =
            toml::from_str(&content).map_err(|e| ConfigError::FileParseFailed {
                path: path.to_string(),
                source: Box::new(e),
            })?;

        if let Some(system) = overrides.prompts.system {
            self.system_prompt = system;
        }
        if let Some(user) = overrides.prompts.user {
            self.user_prompt = user;
        }
        if let Some(rules) = overrides.classifier.rules {
            self.classifier_rules = rules;
        }
        Ok(())
    }
}

fn check_prompt_len(var_name: &str, prompt: &str) -> AppResult<()> {
    let len = prompt.chars().count();
    if len > MAX_PROMPT_CHARS {
        return Err(ConfigError::PromptTooLong {
            var_name: var_name.to_string(),
            len,
            max_len: MAX_PROMPT_CHARS,
        }
        .into());
    }
    Ok(())
}

/// TOML 覆盖文件的结构
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    #[serde(default)]
    prompts: PromptOverrides,
    #[serde(default)]
    classifier: ClassifierOverrides,
}

#[derive(Debug, Default, Deserialize)]
struct PromptOverrides {
    system: Option<String>,
    user: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ClassifierOverrides {
    rules: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn valid_config() -> Config {
        Config {
            email: "student@example.com".to_string(),
            secret: "s3cret".to_string(),
            llm_api_key: "sk-test".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_email() {
        let config = Config {
            email: String::new(),
            ..valid_config()
        };
        match config.validate() {
            Err(AppError::Config(ConfigError::MissingRequired { var_name })) => {
                assert_eq!(var_name, "EMAIL");
            }
            other => panic!("期望 MissingRequired 错误，实际: {:?}", other),
        }
    }

    #[test]
    fn test_validate_prompt_too_long() {
        let config = Config {
            system_prompt: "很".repeat(101),
            ..valid_config()
        };
        match config.validate() {
            Err(AppError::Config(ConfigError::PromptTooLong { len, max_len, .. })) => {
                assert_eq!(len, 101);
                assert_eq!(max_len, 100);
            }
            other => panic!("期望 PromptTooLong 错误，实际: {:?}", other),
        }
    }

    #[test]
    fn test_prompt_at_limit_is_ok() {
        let config = Config {
            user_prompt: "a".repeat(100),
            ..valid_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_overrides() {
        let mut config = valid_config();
        let dir = std::env::temp_dir().join("quiz_auto_solve_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("override.toml");
        std::fs::write(
            &path,
            r#"
[prompts]
system = "Answer briefly."

[classifier]
rules = ["tabular", "document"]
"#,
        )
        .unwrap();

        config
            .apply_file_overrides(path.to_str().unwrap())
            .unwrap();
        assert_eq!(config.system_prompt, "Answer briefly.");
        assert_eq!(config.classifier_rules, vec!["tabular", "document"]);
        // 未覆盖的项保持原值
        assert_eq!(config.user_prompt, "");
    }
}
