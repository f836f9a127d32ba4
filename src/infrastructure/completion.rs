//! LLM 补全服务 - 基础设施层
//!
//! 只负责"向 LLM 提问"能力，不关心题目流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, CompletionError};

/// 默认系统提示词
const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that solves data-related quiz questions accurately.";

/// 默认用户提示词（引导句，题目内容追加在后面）
const DEFAULT_USER_PROMPT: &str = "Solve the following quiz question:";

/// LLM 补全能力
///
/// 职责：
/// - 把题目文本（和可选的数据上下文）发给 LLM
/// - 返回 LLM 的文本回答
/// - 不认识 Question / Session
/// - 不关心流程顺序
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// 请求 LLM 回答题目
    ///
    /// # 参数
    /// - `question`: 题目文本
    /// - `context`: 可选的数据上下文（表格预览、JSON 等），追加在题目后面
    ///
    /// # 返回
    /// 返回 LLM 回答的文本（已去除首尾空白）
    async fn complete(&self, question: &str, context: Option<&str>) -> AppResult<String>;
}

/// 基于 OpenAI 兼容 API 的补全服务
pub struct OpenAiCompletion {
    client: Client<OpenAIConfig>,
    model_name: String,
    system_prompt: String,
    user_prompt: String,
}

impl OpenAiCompletion {
    /// 创建新的补全服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        // 平台限制提示词长度，超长的在配置加载阶段就被拒绝
        let system_prompt = if config.system_prompt.is_empty() {
            DEFAULT_SYSTEM_PROMPT.to_string()
        } else {
            config.system_prompt.clone()
        };
        let user_prompt = if config.user_prompt.is_empty() {
            DEFAULT_USER_PROMPT.to_string()
        } else {
            config.user_prompt.clone()
        };

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            system_prompt,
            user_prompt,
        }
    }

    /// 构建用户消息
    fn build_user_message(&self, question: &str, context: Option<&str>) -> String {
        let mut message = format!("{}\n\n{}", self.user_prompt, question);

        if let Some(data) = context {
            message.push_str(&format!("\n\nData:\n{}", data));
        }

        message.push_str(
            "\n\nProvide a clear, direct answer. If it's a number, provide only the number. \
             If it's text, provide the text. Be precise and accurate.",
        );

        message
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn complete(&self, question: &str, context: Option<&str>) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("题目长度: {} 字符", question.len());
        if let Some(data) = context {
            debug!("上下文长度: {} 字符", data.len());
        }

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(self.system_prompt.as_str())
            .build()
            .map_err(|e| AppError::completion_request_failed(&self.model_name, e))?;

        let user_message = self.build_user_message(question, context);
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| AppError::completion_request_failed(&self.model_name, e))?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        // 低温度保证答案稳定，数字题不需要发散
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.1)
            .max_tokens(2000u32)
            .build()
            .map_err(|e| AppError::completion_request_failed(&self.model_name, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            AppError::completion_request_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                AppError::Completion(CompletionError::EmptyResponse {
                    model: self.model_name.clone(),
                })
            })?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_completion() -> OpenAiCompletion {
        let mut config = Config::default();
        config.llm_api_key = "test-key".to_string();
        config.llm_model_name = "gpt-4o-mini".to_string();
        OpenAiCompletion::new(&config)
    }

    #[test]
    fn test_build_user_message_without_context() {
        let completion = test_completion();
        let message = completion.build_user_message("What is 2 + 2?", None);

        assert!(message.starts_with("Solve the following quiz question:"));
        assert!(message.contains("What is 2 + 2?"));
        assert!(!message.contains("Data:"));
        assert!(message.contains("provide only the number"));
    }

    #[test]
    fn test_build_user_message_with_context() {
        let completion = test_completion();
        let message = completion.build_user_message("Sum the value column", Some("a,b\n1,2"));

        assert!(message.contains("Data:\na,b\n1,2"));
    }

    #[test]
    fn test_prompt_overrides() {
        let mut config = Config::default();
        config.llm_api_key = "test-key".to_string();
        config.system_prompt = "You are a quiz bot.".to_string();
        config.user_prompt = "Answer this question:".to_string();

        let completion = OpenAiCompletion::new(&config);
        assert_eq!(completion.system_prompt, "You are a quiz bot.");

        let message = completion.build_user_message("Q?", None);
        assert!(message.starts_with("Answer this question:"));
    }

    /// 测试 LLM API 连接性（需要真实 API 密钥）
    ///
    /// 运行方式：
    /// ```bash
    /// cargo test test_complete_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_complete_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let mut config = Config::from_env();
        if config.llm_api_key.is_empty() {
            config.llm_api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        }

        let completion = OpenAiCompletion::new(&config);

        println!("\n========== 测试 LLM 补全 ==========");
        let result = completion.complete("What is 2 + 2?", None).await;

        match result {
            Ok(answer) => {
                println!("✅ LLM 调用成功！");
                println!("回答: {}", answer);
                assert!(!answer.is_empty());
            }
            Err(e) => {
                println!("❌ LLM 调用失败: {}", e);
                panic!("测试失败: {}", e);
            }
        }
    }
}
