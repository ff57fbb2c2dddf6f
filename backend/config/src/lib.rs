//! `charmline-config`: Charmline runtime configuration management.
//!
//! Provides:
//! - Typed config schema (server, generation backend, OCR, logging)
//! - YAML loading with `${ENV_VAR}` substitution
//! - Well-known environment overrides (`OPENAI_API_KEY`, `PORT`, ...)
//! - Default value application
//! - Validation with errors and warnings
//! - Config redaction for safe logging

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::apply_all_defaults;
pub use env::{
    apply_env_overrides, apply_env_overrides_with, resolve_env_vars,
    resolve_env_vars_with, MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_config_value};
pub use redact::redact;
pub use schema::{
    CharmlineConfig, GenerationConfig, LoggingConfig, OcrConfig, ProviderKind, ServerConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load, substitute env vars, apply overrides and defaults, and validate.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<CharmlineConfig> {
    let value = load_config_value(path).await?;
    prepare(value, &std::env::vars().collect())
}

/// The synchronous half of [`load_and_prepare`], with an explicit environment.
pub fn prepare(value: Value, env: &HashMap<String, String>) -> Result<CharmlineConfig> {
    let value = resolve_env_vars_with(&value, env).context("Failed to resolve env vars in config")?;

    let config: CharmlineConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;

    let config = apply_env_overrides_with(config, env);
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("Invalid configuration ({} error(s)); first: {first}", report.errors.len());
    }

    if let Ok(snapshot) = serde_json::to_value(&config) {
        tracing::debug!(config = %redact(&snapshot), "Effective config");
    }
    Ok(config)
}
