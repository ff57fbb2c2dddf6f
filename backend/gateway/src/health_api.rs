//! Gateway Health API

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::GatewayState;

#[derive(Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub model: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Handler for `GET /api/health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    let generator = state.pipeline.generator();
    Json(HealthReport {
        status: "ok",
        service: "charmline",
        version: env!("CARGO_PKG_VERSION"),
        provider: generator.provider_name().to_string(),
        model: generator.params().model.clone(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
