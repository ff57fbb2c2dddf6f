use std::future::Future;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use charmline_core::{InputSource, SuggestError, UploadedImage, ValidationError};
use charmline_generation::GenerationClient;
use charmline_understanding::TextExtractor;

use crate::normalize::{normalize, SuggestionOutcome};
use crate::prompt::PromptBuilder;

/// Per-request pipeline states, logged as the run advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Extracting,
    Prompting,
    Generating,
    Normalizing,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Extracting => "extracting",
            PipelineStage::Prompting => "prompting",
            PipelineStage::Generating => "generating",
            PipelineStage::Normalizing => "normalizing",
            PipelineStage::Done => "done",
        }
    }
}

/// Validated input for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionInput {
    Screenshot(UploadedImage),
    DirectText(String),
}

impl SuggestionInput {
    /// Absent or zero-length uploads are rejected before any backend runs.
    pub fn screenshot(data: Option<Bytes>) -> Result<Self, ValidationError> {
        match data {
            Some(data) if !data.is_empty() => Ok(Self::Screenshot(UploadedImage::new(data))),
            _ => Err(ValidationError::MissingImage),
        }
    }

    /// Absent, empty, or whitespace-only text is rejected.
    pub fn direct_text(text: Option<String>) -> Result<Self, ValidationError> {
        match text {
            Some(text) if !text.trim().is_empty() => Ok(Self::DirectText(text)),
            _ => Err(ValidationError::MissingText),
        }
    }

    pub fn source(&self) -> InputSource {
        match self {
            SuggestionInput::Screenshot(_) => InputSource::Screenshot,
            SuggestionInput::DirectText(_) => InputSource::DirectText,
        }
    }
}

/// Sequences extraction, prompting, and generation for a single request.
///
/// Holds only read-only collaborators, so one instance serves all requests.
#[derive(Clone)]
pub struct SuggestionPipeline {
    extractor: TextExtractor,
    generator: GenerationClient,
}

impl SuggestionPipeline {
    pub fn new(extractor: TextExtractor, generator: GenerationClient) -> Self {
        Self { extractor, generator }
    }

    pub fn generator(&self) -> &GenerationClient {
        &self.generator
    }

    /// Run the full request: validation short-circuit, pipeline, normalization.
    ///
    /// The route is taken from the input itself, or from the validation error
    /// when the input was rejected.
    pub async fn respond(
        &self,
        input: Result<SuggestionInput, ValidationError>,
        cancel: &CancellationToken,
    ) -> SuggestionOutcome {
        let source = match &input {
            Ok(input) => input.source(),
            Err(err) => err.source(),
        };
        let span = info_span!(
            "suggestion",
            request_id = %Uuid::new_v4(),
            source = source.as_str()
        );

        async move {
            stage(PipelineStage::Received);
            let result = match input {
                Ok(input) => self.suggest(input, cancel).await,
                Err(err) => Err(err.into()),
            };
            stage(PipelineStage::Normalizing);
            let outcome = normalize(source, result);
            stage(PipelineStage::Done);
            outcome
        }
        .instrument(span)
        .await
    }

    /// Produce a raw reply for validated input. Terminal on the first failure.
    pub async fn suggest(
        &self,
        input: SuggestionInput,
        cancel: &CancellationToken,
    ) -> Result<String, SuggestError> {
        if cancel.is_cancelled() {
            return Err(SuggestError::Cancelled);
        }

        let source = input.source();
        let text = match input {
            SuggestionInput::Screenshot(image) => {
                stage(PipelineStage::Extracting);
                until_cancelled(cancel, self.extractor.extract(&image)).await?
            }
            SuggestionInput::DirectText(text) => text,
        };

        stage(PipelineStage::Prompting);
        let prompt = PromptBuilder::build(source, &text);

        stage(PipelineStage::Generating);
        until_cancelled(cancel, self.generator.generate(&prompt)).await
    }
}

fn stage(stage: PipelineStage) {
    debug!(stage = stage.as_str(), "Pipeline stage");
}

/// Race an I/O stage against the request's cancellation token.
async fn until_cancelled<F, T, E>(cancel: &CancellationToken, fut: F) -> Result<T, SuggestError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<SuggestError>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SuggestError::Cancelled),
        out = fut => out.map_err(Into::into),
    }
}
