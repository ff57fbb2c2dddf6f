//! Direct-text endpoint (`POST /prompt`).
//!
//! Skips OCR: the caller sends the conversation as `{"userInput": "..."}`.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::Response,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use charmline_pipeline::SuggestionInput;

use crate::server::{GatewayState, into_response};

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    #[serde(rename = "userInput", default)]
    pub user_input: Option<String>,
}

/// Handler for `POST /prompt`.
///
/// A body that is not JSON, or whose `userInput` is not a string, counts as
/// a missing prompt.
pub async fn suggest_from_text(
    State(state): State<GatewayState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Response {
    let user_input = match payload {
        Ok(Json(req)) => req.user_input,
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable prompt body");
            None
        }
    };

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let outcome = state
        .pipeline
        .respond(SuggestionInput::direct_text(user_input), &cancel)
        .await;
    into_response(outcome)
}
