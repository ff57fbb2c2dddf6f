//! Main HTTP Gateway Server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use charmline_pipeline::{SuggestionOutcome, SuggestionPipeline};

use crate::{health_api, prompt_api, upload};

/// Application state shared across routes. Read-only after startup.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: Arc<SuggestionPipeline>,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(pipeline: SuggestionPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            started_at: Instant::now(),
        }
    }
}

/// Build the router with all routes.
pub fn build_router(state: GatewayState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/upload", post(upload::upload_screenshot))
        .route("/prompt", post(prompt_api::suggest_from_text))
        .route("/api/health", get(health_api::get_health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the HTTP server and runs until `shutdown` resolves.
#[instrument(skip(app, shutdown))]
pub async fn start_server<F>(addr: SocketAddr, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(&addr).await?;
    info!("Gateway HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Gateway HTTP server stopped");
    Ok(())
}

pub(crate) fn into_response(outcome: SuggestionOutcome) -> Response {
    (outcome.status, Json(outcome.body)).into_response()
}
