use thiserror::Error;

use crate::types::InputSource;

/// Missing or unusable input. The caller's fault, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no screenshot was uploaded")]
    MissingImage,

    #[error("no conversation text was provided")]
    MissingText,
}

impl ValidationError {
    /// The route whose input was missing.
    pub fn source(&self) -> InputSource {
        match self {
            ValidationError::MissingImage => InputSource::Screenshot,
            ValidationError::MissingText => InputSource::DirectText,
        }
    }
}

/// Failure while turning an image into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("image buffer is empty")]
    EmptyImage,

    #[error("OCR backend unavailable ({backend}): {message}")]
    BackendUnavailable { backend: String, message: String },

    #[error("OCR backend failed ({backend}, {status}): {stderr}")]
    BackendFailed {
        backend: String,
        status: String,
        stderr: String,
    },

    #[error("OCR I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while asking the chat-completion backend for a reply.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no credential configured for the generation backend")]
    MissingCredential,

    #[error("generation backend rejected the credential (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("generation backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("generation request timed out")]
    Timeout,

    #[error("generation transport error: {0}")]
    Transport(String),

    #[error("malformed generation response: {0}")]
    Malformed(String),

    #[error("generation response contained no choices")]
    NoChoices,

    #[error("generation backend returned an empty reply")]
    EmptyReply,
}

/// Every way a suggestion request can end without a reply.
///
/// The gateway maps each variant to a status code and a generic message;
/// the `Display` output of the inner errors is for logs only.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("request cancelled before completion")]
    Cancelled,
}

impl SuggestError {
    /// Short machine-friendly label used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            SuggestError::Validation(_) => "validation",
            SuggestError::Extraction(_) => "extraction",
            SuggestError::Generation(_) => "generation",
            SuggestError::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_inner_errors_with_stage_prefix() {
        let err: SuggestError = GenerationError::NoChoices.into();
        assert_eq!(err.kind(), "generation");
        assert!(err.to_string().starts_with("generation failed"));

        let err: SuggestError = ExtractionError::EmptyImage.into();
        assert_eq!(err.kind(), "extraction");
    }

    #[test]
    fn validation_knows_its_source() {
        assert_eq!(ValidationError::MissingImage.source(), InputSource::Screenshot);
        assert_eq!(ValidationError::MissingText.source(), InputSource::DirectText);

        let err: SuggestError = ValidationError::MissingText.into();
        assert_eq!(err.kind(), "validation");
        assert_eq!(err.to_string(), "no conversation text was provided");
    }
}
