//! Charmline runtime configuration schema.
//!
//! Every section is optional in the YAML file; missing fields take the
//! values from [`crate::defaults`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::defaults;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharmlineConfig {
    pub server: ServerConfig,
    pub generation: GenerationConfig,
    pub ocr: OcrConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: defaults::DEFAULT_BIND_ADDRESS.to_string(),
            port: defaults::DEFAULT_PORT,
            max_upload_bytes: defaults::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

// ---------------------------------------------------------------------------
// Generation backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible `/chat/completions` endpoint.
    #[default]
    OpenAi,
    /// Canned replies, for running without a credential.
    Mock,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Mock => "mock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    pub provider: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_key: None,
            base_url: defaults::DEFAULT_BASE_URL.to_string(),
            model: defaults::DEFAULT_MODEL.to_string(),
            max_tokens: defaults::DEFAULT_MAX_TOKENS,
            temperature: defaults::DEFAULT_TEMPERATURE,
            timeout_secs: defaults::DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// OCR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OcrConfig {
    /// Path or name of the tesseract executable.
    pub binary: String,
    /// Directory with `*.traineddata`; tesseract's own default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tessdata_dir: Option<PathBuf>,
    pub languages: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: defaults::DEFAULT_OCR_BINARY.to_string(),
            tessdata_dir: None,
            languages: defaults::default_languages(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            dir: None,
            json: false,
        }
    }
}
