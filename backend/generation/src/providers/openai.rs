use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use charmline_core::{ChatMessage, GenerationError, LlmProvider, LlmRequest, LlmResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible chat-completion provider.
pub struct OpenAiProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiProvider {
    /// A blank key is treated as absent and fails each call before it leaves the process.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound each call; a hung backend surfaces as [`GenerationError::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, GenerationError> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        Ok(self)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: Option<u64>,
}

fn transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Transport(e.to_string())
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingCredential)?;
        let start = Instant::now();

        let body = ChatRequest {
            model: &request.model,
            messages: request.messages(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GenerationError::Unauthorized { status: status.as_u16() });
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Backend {
                status: status.as_u16(),
                body: error_body,
            });
        }

        let raw = response.bytes().await.map_err(transport_error)?;
        let chat_response: ChatResponse = serde_json::from_slice(&raw)
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        let choices = chat_response
            .choices
            .into_iter()
            .map(|c| c.message.content.unwrap_or_default())
            .collect();

        Ok(LlmResponse {
            choices,
            provider: "openai".to_string(),
            model: chat_response.model.unwrap_or_else(|| request.model.clone()),
            tokens_used: chat_response
                .usage
                .and_then(|u| u.total_tokens)
                .unwrap_or(0),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
