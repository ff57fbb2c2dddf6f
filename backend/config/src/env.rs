//! Environment variables in config.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references in string values, resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names are matched and `$${VAR}`
//!   escapes to a literal `${VAR}`.
//! - Well-known variables (`OPENAI_API_KEY`, `PORT`, ...) that override
//!   file values, so a deployment can run with no config file at all.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

use crate::schema::{CharmlineConfig, ProviderKind};

/// `${VAR}` or the escaped form `$${VAR}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\$)?\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree.
///
/// Only string leaves are processed. Returns an error if any referenced env
/// var is unset or empty.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    substitute_value(value, &std::env::vars().collect(), "")
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[2];
        if caps.get(1).is_some() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Apply well-known environment overrides from the process environment.
pub fn apply_env_overrides(config: CharmlineConfig) -> CharmlineConfig {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply well-known environment overrides from a provided map.
///
/// Blank values are ignored; unparseable numbers are logged and ignored.
pub fn apply_env_overrides_with(
    mut config: CharmlineConfig,
    env: &HashMap<String, String>,
) -> CharmlineConfig {
    let get = |name: &str| {
        env.get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    if let Some(key) = get("OPENAI_API_KEY") {
        config.generation.api_key = Some(key);
    }
    if let Some(url) = get("OPENAI_BASE_URL") {
        config.generation.base_url = url;
    }
    if let Some(model) = get("CHARMLINE_MODEL") {
        config.generation.model = model;
    }
    if let Some(provider) = get("CHARMLINE_PROVIDER") {
        match provider.to_ascii_lowercase().as_str() {
            "openai" => config.generation.provider = ProviderKind::OpenAi,
            "mock" => config.generation.provider = ProviderKind::Mock,
            other => warn!(value = %other, "Ignoring unknown CHARMLINE_PROVIDER"),
        }
    }
    if let Some(bind) = get("CHARMLINE_BIND") {
        config.server.bind_address = bind;
    }
    // CHARMLINE_PORT wins over the generic PORT.
    for name in ["PORT", "CHARMLINE_PORT"] {
        if let Some(port) = get(name) {
            match port.parse() {
                Ok(port) => config.server.port = port,
                Err(_) => warn!(var = name, value = %port, "Ignoring invalid port"),
            }
        }
    }
    if let Some(dir) = get("TESSDATA_PREFIX") {
        config.ocr.tessdata_dir = Some(PathBuf::from(dir));
    }
    if let Some(level) = get("RUST_LOG") {
        config.logging.level = level;
    }

    config
}
