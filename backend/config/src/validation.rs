//! Config validation: deep schema checks with user-friendly error messages.

use crate::schema::{CharmlineConfig, ProviderKind};
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &CharmlineConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_generation(config, &mut report);
    validate_ocr(config, &mut report);
    report
}

fn validate_server(config: &CharmlineConfig, report: &mut ValidationReport) {
    let server = &config.server;
    if server.port == 0 {
        report.warn("server.port", "Port 0 binds a random port");
    } else if server.port < 1024 && server.port != 80 && server.port != 443 {
        report.warn(
            "server.port",
            format!(
                "Port {} requires elevated privileges; consider using a port >= 1024",
                server.port
            ),
        );
    }
    if server.max_upload_bytes == 0 {
        report.error("server.maxUploadBytes", "must be > 0");
    }
}

fn validate_generation(config: &CharmlineConfig, report: &mut ValidationReport) {
    let generation = &config.generation;
    if !(0.0..=1.0).contains(&generation.temperature) {
        report.error(
            "generation.temperature",
            format!("must be within [0, 1], got {}", generation.temperature),
        );
    }
    if generation.max_tokens == 0 {
        report.error("generation.maxTokens", "must be > 0");
    }
    if generation.model.trim().is_empty() {
        report.error("generation.model", "Model id cannot be empty");
    }
    if generation.timeout_secs == 0 {
        report.error("generation.timeoutSecs", "must be > 0");
    }
    if generation.provider == ProviderKind::OpenAi {
        if !(generation.base_url.starts_with("http://") || generation.base_url.starts_with("https://")) {
            report.error("generation.baseUrl", "must be an http(s) URL");
        }
        // Requests fail with a generation error until a key is supplied.
        if generation.api_key.is_none() {
            report.warn(
                "generation.apiKey",
                "No API key configured (set OPENAI_API_KEY); every suggestion will fail",
            );
        }
    }
}

fn validate_ocr(config: &CharmlineConfig, report: &mut ValidationReport) {
    let ocr = &config.ocr;
    if ocr.languages.is_empty() {
        report.error("ocr.languages", "At least one language is required");
    }
    for lang in &ocr.languages {
        if !lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            report.error("ocr.languages", format!("Invalid language code '{lang}'"));
        }
    }
    if let Some(dir) = &ocr.tessdata_dir {
        if !dir.is_dir() {
            report.warn(
                "ocr.tessdataDir",
                format!("{} does not exist; OCR will fail", dir.display()),
            );
        }
    }
}
