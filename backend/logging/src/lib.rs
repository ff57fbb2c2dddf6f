//! Structured logging for Charmline.
//!
//! Console output (pretty or JSON), optional daily NDJSON file rotation,
//! and redaction of credentials before backend error text is logged.

pub mod logger;
pub mod redact;

pub use logger::{init_logger, LogOptions};
pub use redact::redact_sensitive_data;
pub use tracing_appender::non_blocking::WorkerGuard;
