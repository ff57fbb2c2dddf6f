use async_trait::async_trait;

use crate::error::{ExtractionError, GenerationError};
use crate::types::{LanguageHints, LlmRequest, LlmResponse};

/// Trait for OCR engines used by the text extractor.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Backend name (e.g., "tesseract", "mock").
    fn name(&self) -> &str;

    /// Recognize the text in a raster image. The result is returned untrimmed.
    async fn recognize(
        &self,
        image: &[u8],
        languages: &LanguageHints,
    ) -> Result<String, ExtractionError>;
}

/// Trait for chat-completion backends used by the generation client.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "openai", "mock").
    fn name(&self) -> &str;

    /// Send one completion request and return every choice the backend produced.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, GenerationError>;
}
