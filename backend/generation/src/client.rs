use std::sync::Arc;

use tracing::{debug, info};

use charmline_core::{
    ConversationPrompt, GenerationError, GenerationParams, LlmProvider, LlmRequest,
};

/// Sends a prompt to one provider and returns its single reply.
///
/// One call per request: no retries, no backoff, no caching. Identical
/// prompts always reach the backend again.
#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn LlmProvider>,
    params: GenerationParams,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn LlmProvider>, params: GenerationParams) -> Self {
        Self { provider, params }
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn generate(&self, prompt: &ConversationPrompt) -> Result<String, GenerationError> {
        self.generate_with(prompt, &self.params).await
    }

    pub async fn generate_with(
        &self,
        prompt: &ConversationPrompt,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let request = LlmRequest::from_prompt(prompt, params);
        debug!(
            provider = self.provider.name(),
            model = %request.model,
            temperature = request.temperature,
            "Requesting suggestion"
        );

        let response = self.provider.complete(&request).await?;
        let first = response
            .choices
            .into_iter()
            .next()
            .ok_or(GenerationError::NoChoices)?;

        let reply = first.trim();
        if reply.is_empty() {
            return Err(GenerationError::EmptyReply);
        }

        info!(
            provider = %response.provider,
            model = %response.model,
            tokens = response.tokens_used,
            latency_ms = response.latency_ms,
            "Suggestion generated"
        );
        Ok(reply.to_string())
    }
}
