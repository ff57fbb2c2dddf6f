//! Config defaults: default values and normalization of blank fields.

use crate::schema::{CharmlineConfig, GenerationConfig, LoggingConfig, OcrConfig, ServerConfig};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 3000;

/// 10 MiB; phone screenshots are well under this.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_MODEL: &str = "gpt-4";

pub const DEFAULT_MAX_TOKENS: u32 = 100;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_OCR_BINARY: &str = "tesseract";

pub const DEFAULT_LANGUAGES: [&str; 2] = ["kor", "eng"];

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub fn default_languages() -> Vec<String> {
    DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect()
}

/// Apply all defaults to a freshly loaded config.
///
/// Serde already fills missing keys; this pass repairs keys that are present
/// but blank (e.g. `model: ""` or an env var that expanded to whitespace).
pub fn apply_all_defaults(mut config: CharmlineConfig) -> CharmlineConfig {
    apply_server_defaults(&mut config.server);
    apply_generation_defaults(&mut config.generation);
    apply_ocr_defaults(&mut config.ocr);
    apply_logging_defaults(&mut config.logging);
    config
}

fn or_default(value: &mut String, default: &str) {
    if value.trim().is_empty() {
        *value = default.to_string();
    } else {
        *value = value.trim().to_string();
    }
}

fn apply_server_defaults(server: &mut ServerConfig) {
    or_default(&mut server.bind_address, DEFAULT_BIND_ADDRESS);
}

fn apply_generation_defaults(generation: &mut GenerationConfig) {
    or_default(&mut generation.model, DEFAULT_MODEL);
    or_default(&mut generation.base_url, DEFAULT_BASE_URL);
    generation.base_url = generation.base_url.trim_end_matches('/').to_string();
    if generation
        .api_key
        .as_deref()
        .is_some_and(|k| k.trim().is_empty())
    {
        generation.api_key = None;
    }
}

fn apply_ocr_defaults(ocr: &mut OcrConfig) {
    or_default(&mut ocr.binary, DEFAULT_OCR_BINARY);
    ocr.languages = ocr
        .languages
        .iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    if ocr.languages.is_empty() {
        ocr.languages = default_languages();
    }
}

fn apply_logging_defaults(logging: &mut LoggingConfig) {
    or_default(&mut logging.level, DEFAULT_LOG_LEVEL);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_get_defaults() {
        let mut cfg = CharmlineConfig::default();
        cfg.generation.model = "  ".into();
        cfg.generation.api_key = Some("".into());
        cfg.ocr.languages = vec![" ".into()];
        cfg.logging.level = String::new();

        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.generation.model, DEFAULT_MODEL);
        assert_eq!(cfg.generation.api_key, None);
        assert_eq!(cfg.ocr.languages, default_languages());
        assert_eq!(cfg.logging.level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn does_not_override_user_values() {
        let mut cfg = CharmlineConfig::default();
        cfg.generation.model = "gpt-4o".into();
        cfg.generation.base_url = "http://localhost:8000/v1/".into();
        cfg.ocr.languages = vec!["jpn".into()];

        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.generation.model, "gpt-4o");
        assert_eq!(cfg.generation.base_url, "http://localhost:8000/v1");
        assert_eq!(cfg.ocr.languages, vec!["jpn"]);
    }
}
