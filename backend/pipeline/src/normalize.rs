//! Response normalization: every pipeline outcome becomes a status code and
//! a `{message}` or `{error}` body. Error details go to the logs only.

use http::StatusCode;
use tracing::{debug, error, info};

use charmline_core::{GenerationError, InputSource, SuggestError, SuggestionResponse, ValidationError};
use charmline_logging::redact_sensitive_data;

pub const NO_FILE: &str = "no file";
pub const NO_PROMPT: &str = "no prompt";
pub const SERVER_ERROR: &str = "server error";
pub const GENERIC_ERROR: &str = "generic error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionOutcome {
    pub status: StatusCode,
    pub body: SuggestionResponse,
}

impl SuggestionOutcome {
    fn ok(message: String) -> Self {
        Self {
            status: StatusCode::OK,
            body: SuggestionResponse::message(message),
        }
    }

    fn fail(status: StatusCode, error: &str) -> Self {
        Self {
            status,
            body: SuggestionResponse::error(error),
        }
    }
}

fn validation_message(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::MissingImage => NO_FILE,
        ValidationError::MissingText => NO_PROMPT,
    }
}

/// The only error text a caller of each route ever sees for a server-side failure.
pub fn generic_error_message(source: InputSource) -> &'static str {
    match source {
        InputSource::Screenshot => SERVER_ERROR,
        InputSource::DirectText => GENERIC_ERROR,
    }
}

/// Map a pipeline result onto the outward response contract.
pub fn normalize(source: InputSource, result: Result<String, SuggestError>) -> SuggestionOutcome {
    let result = result.and_then(|reply| {
        let reply = reply.trim();
        if reply.is_empty() {
            Err(GenerationError::EmptyReply.into())
        } else {
            Ok(reply.to_string())
        }
    });

    match result {
        Ok(reply) => SuggestionOutcome::ok(reply),
        Err(SuggestError::Validation(err)) => {
            info!(source = source.as_str(), reason = %err, "Rejected request");
            SuggestionOutcome::fail(StatusCode::BAD_REQUEST, validation_message(&err))
        }
        Err(err @ (SuggestError::Extraction(_) | SuggestError::Generation(_))) => {
            error!(
                source = source.as_str(),
                kind = err.kind(),
                error = %redact_sensitive_data(&err.to_string()),
                "Suggestion pipeline failed"
            );
            SuggestionOutcome::fail(
                StatusCode::INTERNAL_SERVER_ERROR,
                generic_error_message(source),
            )
        }
        Err(SuggestError::Cancelled) => {
            debug!(source = source.as_str(), "Suggestion abandoned by caller");
            SuggestionOutcome::fail(
                StatusCode::INTERNAL_SERVER_ERROR,
                generic_error_message(source),
            )
        }
    }
}
