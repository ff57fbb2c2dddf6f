//! Charmline Gateway HTTP API Server
//!
//! Exposes the screenshot upload and direct-text suggestion endpoints plus
//! a health probe.

pub mod health_api;
pub mod prompt_api;
pub mod server;
pub mod upload;

pub use server::{GatewayState, build_router, start_server};
