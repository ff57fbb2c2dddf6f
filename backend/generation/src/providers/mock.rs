use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use charmline_core::{GenerationError, LlmProvider, LlmRequest, LlmResponse};

enum Reply {
    Fixed(String),
    Echo,
    Choices(Vec<String>),
    Fail(String),
}

/// A mock LLM provider that returns canned responses and records its calls.
pub struct MockProvider {
    name: String,
    reply: Reply,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reply: Reply::Fixed("Mock response".to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.reply = Reply::Fixed(response.into());
        self
    }

    /// Reply with the content of the user message, verbatim.
    pub fn echoing(mut self) -> Self {
        self.reply = Reply::Echo;
        self
    }

    /// Return exactly these choices (possibly none).
    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.reply = Reply::Choices(choices);
        self
    }

    /// Fail every call as if the backend answered HTTP 500 with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.reply = Reply::Fail(message.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request seen so far, in arrival order.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let choices = match &self.reply {
            Reply::Fixed(text) => vec![text.clone()],
            Reply::Echo => vec![request.user_content().to_string()],
            Reply::Choices(choices) => choices.clone(),
            Reply::Fail(message) => {
                return Err(GenerationError::Backend {
                    status: 500,
                    body: message.clone(),
                })
            }
        };

        Ok(LlmResponse {
            choices,
            provider: self.name.clone(),
            model: request.model.clone(),
            tokens_used: 0,
            latency_ms: 0,
        })
    }
}
