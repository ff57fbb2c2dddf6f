//! Turning a loaded config into running components.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use charmline_config::{
    config_dir, config_file_path, load_and_prepare, validate, CharmlineConfig, GenerationConfig,
    OcrConfig, ProviderKind,
};
use charmline_core::{GenerationParams, LanguageHints, LlmProvider};
use charmline_generation::{GenerationClient, MockProvider, OpenAiProvider};
use charmline_logging::{init_logger, LogOptions, WorkerGuard};
use charmline_pipeline::SuggestionPipeline;
use charmline_understanding::{TesseractBackend, TextExtractor};

/// Load the config from `path`, or from the default location.
pub async fn load_config(path: Option<&Path>) -> Result<CharmlineConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config_file_path(&config_dir()),
    };
    load_and_prepare(&path)
        .await
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

pub fn log_options(config: &CharmlineConfig) -> LogOptions {
    LogOptions {
        level: config.logging.level.clone(),
        dir: config.logging.dir.clone(),
        json: config.logging.json,
    }
}

/// Install the global subscriber, then replay config warnings so they reach it.
pub fn init_logging(config: &CharmlineConfig, options: &LogOptions) -> Option<WorkerGuard> {
    let guard = init_logger(options);
    for warning in validate(config).warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    guard
}

pub fn bind_addr(config: &CharmlineConfig) -> Result<SocketAddr> {
    let ip: IpAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.server.bind_address))?;
    Ok(SocketAddr::new(ip, config.server.port))
}

pub fn build_provider(config: &GenerationConfig) -> Result<Arc<dyn LlmProvider>> {
    match config.provider {
        ProviderKind::OpenAi => {
            let provider = OpenAiProvider::new(config.api_key.clone())
                .with_base_url(&config.base_url)
                .with_timeout(Duration::from_secs(config.timeout_secs))
                .context("Failed to build OpenAI client")?;
            Ok(Arc::new(provider))
        }
        ProviderKind::Mock => Ok(Arc::new(MockProvider::new("mock"))),
    }
}

pub fn build_extractor(config: &OcrConfig) -> TextExtractor {
    let mut backend = TesseractBackend::new().with_binary(&config.binary);
    if let Some(dir) = &config.tessdata_dir {
        backend = backend.with_tessdata_dir(dir);
    }
    TextExtractor::new(Arc::new(backend))
        .with_languages(LanguageHints::new(config.languages.iter().map(String::as_str)))
}

/// Wire OCR and generation into a pipeline.
pub fn build_pipeline(config: &CharmlineConfig) -> Result<SuggestionPipeline> {
    let provider = build_provider(&config.generation)?;
    let params = GenerationParams {
        model: config.generation.model.clone(),
        max_tokens: config.generation.max_tokens,
        temperature: config.generation.temperature,
    };
    info!(
        provider = provider.name(),
        model = %params.model,
        ocr = %config.ocr.binary,
        languages = %config.ocr.languages.join("+"),
        "Suggestion pipeline ready"
    );

    Ok(SuggestionPipeline::new(
        build_extractor(&config.ocr),
        GenerationClient::new(provider, params),
    ))
}
