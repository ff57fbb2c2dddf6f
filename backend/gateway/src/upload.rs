//! Screenshot upload endpoint (`POST /upload`).
//!
//! Accepts a multipart form whose `screenshot` field holds the image. The
//! buffer lives only in memory for the duration of the request.

use axum::{
    extract::{Multipart, State, multipart::MultipartRejection},
    response::Response,
};
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use charmline_pipeline::SuggestionInput;

use crate::server::{GatewayState, into_response};

/// Multipart field carrying the image.
pub const SCREENSHOT_FIELD: &str = "screenshot";

/// Handler for `POST /upload`.
pub async fn upload_screenshot(
    State(state): State<GatewayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let data = match multipart {
        Ok(multipart) => read_screenshot(multipart).await,
        Err(rejection) => {
            warn!(error = %rejection, "Upload is not a multipart form");
            None
        }
    };

    // Dropped with this future when the client goes away.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let outcome = state
        .pipeline
        .respond(SuggestionInput::screenshot(data), &cancel)
        .await;
    into_response(outcome)
}

/// Pull the first `screenshot` field out of the form, ignoring all others.
async fn read_screenshot(mut multipart: Multipart) -> Option<Bytes> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Malformed multipart body");
                return None;
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        if name != SCREENSHOT_FIELD {
            debug!(field = %name, "Skipping unrelated form field");
            continue;
        }

        return match field.bytes().await {
            Ok(bytes) => {
                info!(bytes = bytes.len(), "Received screenshot upload");
                Some(bytes)
            }
            Err(e) => {
                warn!(error = %e, "Failed to read screenshot field");
                None
            }
        };
    }
}
