//! OpenRouter HTTP client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::base::{
    ChatReply, LlmProvider, Message, ProviderError, ProviderResult, TokenUsage,
};

const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";

/// OpenRouter API request format
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
}

/// OpenRouter API response format
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Usage {
    #[serde(default)]
    prompt_tokens: i64,
    #[serde(default)]
    completion_tokens: i64,
    #[serde(default)]
    total_tokens: i64,
}

/// OpenRouter provider client
pub struct OpenRouterClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    default_model: String,
    referer: Option<String>,
    title: Option<String>,
}

impl OpenRouterClient {
    /// Create a new OpenRouter client
    pub fn new(
        api_key: Option<String>,
        api_base: Option<String>,
        default_model: String,
        referer: Option<String>,
        title: Option<String>,
    ) -> Self {
        let api_base = api_base
            .and_then(|base| {
                let trimmed = base.trim().trim_end_matches('/').to_string();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed)
                }
            })
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Self {
            client: Client::new(),
            api_base,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            default_model,
            referer,
            title,
        }
    }

    fn apply_headers(&self, mut req_builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(api_key) = &self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }
        if let Some(referer) = &self.referer {
            req_builder = req_builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            req_builder = req_builder.header("X-Title", title);
        }

        req_builder
    }

    fn parse_response(&self, response: ChatCompletionResponse) -> ProviderResult<ChatReply> {
        let choice = response
            .choices
            .first()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

        Ok(ChatReply {
            content: choice.message.content.clone(),
            finish_reason: choice
                .finish_reason
                .clone()
                .unwrap_or_else(|| "stop".to_string()),
            usage: TokenUsage {
                prompt_tokens: response.usage.prompt_tokens,
                completion_tokens: response.usage.completion_tokens,
                total_tokens: response.usage.total_tokens,
            },
        })
    }
}

#[async_trait]
impl LlmProvider for OpenRouterClient {
    async fn chat(
        &self,
        messages: Vec<Message>,
        model: Option<String>,
        max_tokens: u32,
        temperature: f64,
    ) -> ProviderResult<ChatReply> {
        // Fail before any network I/O when no credential is configured
        if self.api_key.is_none() {
            return Err(ProviderError::MissingApiKey);
        }

        let model = model.unwrap_or_else(|| self.default_model.clone());
        let request = ChatCompletionRequest {
            model: model.clone(),
            messages,
            max_tokens,
            temperature,
            top_p: 1.0,
        };

        debug!(
            "Sending chat request to {} with model {}",
            self.api_base, model
        );

        let url = format!("{}/chat/completions", self.api_base);
        let req_builder = self.apply_headers(self.client.post(&url).json(&request));

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Api(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let response_data: ChatCompletionResponse = response.json().await?;
        self.parse_response(response_data)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }
}
