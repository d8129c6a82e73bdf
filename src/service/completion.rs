//! Chat-completion client for an Azure OpenAI deployment.

use crate::config::CompletionConfig;
use crate::error::app_error::AppError;
use crate::service::prompts::{AGENDA_MAX_TOKENS, BRIEF_MAX_TOKENS, SYSTEM_PROMPT, TEMPERATURE, agenda_prompt, brief_prompt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

const SERVICE: &str = "completion";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    fn with_prompt(prompt: String, max_tokens: u32) -> Self {
        Self {
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            max_tokens,
            temperature: TEMPERATURE,
        }
    }

    pub fn agenda(notes: &str) -> Self {
        Self::with_prompt(agenda_prompt(notes), AGENDA_MAX_TOKENS)
    }

    pub fn brief(notes: &str) -> Self {
        Self::with_prompt(brief_prompt(notes), BRIEF_MAX_TOKENS)
    }
}

#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends one request and returns the text of the first choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AppError>;
}

pub type SharedCompletionClient = Arc<dyn CompletionClient>;

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

pub struct AzureOpenAiClient {
    client: Client,
    config: CompletionConfig,
}

impl AzureOpenAiClient {
    pub fn new(config: CompletionConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .map_err(|e| AppError::InvalidConfig(format!("Failed to create completion HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment,
            self.config.api_version
        )
    }
}

#[async_trait::async_trait]
impl CompletionClient for AzureOpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AppError> {
        debug!(deployment = %self.config.deployment, max_tokens = request.max_tokens, "Sending completion request");

        let response = self
            .client
            .post(self.url())
            .header("api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Completion endpoint unreachable");
                AppError::transport(SERVICE, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Completion endpoint returned an error");
            return Err(AppError::upstream_status(SERVICE, "Azure OpenAI", status.as_u16(), &body));
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse completion response");
            AppError::upstream(SERVICE, format!("Failed to parse Azure OpenAI response: {}", e))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::upstream(SERVICE, "Azure OpenAI returned no choices"))
    }
}
