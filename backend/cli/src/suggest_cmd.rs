//! CLI Suggest Command
//!
//! Runs one suggestion through the local pipeline and prints the reply.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use charmline_pipeline::{SuggestionInput, SuggestionPipeline};

/// Where the conversation comes from.
#[derive(Debug, Clone)]
pub enum SuggestSource {
    Image(PathBuf),
    Text(String),
}

pub async fn run(pipeline: &SuggestionPipeline, source: SuggestSource) -> Result<()> {
    let input = read_input(source).await?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; cancelling suggestion");
            on_interrupt.cancel();
        }
    });

    let reply = pipeline
        .suggest(input, &cancel)
        .await
        .context("Suggestion failed")?;
    println!("{}", reply.trim());
    Ok(())
}

async fn read_input(source: SuggestSource) -> Result<SuggestionInput> {
    let input = match source {
        SuggestSource::Image(path) => {
            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            info!(path = %path.display(), bytes = data.len(), "Loaded screenshot");
            SuggestionInput::screenshot(Some(Bytes::from(data)))
        }
        SuggestSource::Text(text) => SuggestionInput::direct_text(Some(text)),
    };
    Ok(input?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use charmline_core::InputSource;

    #[tokio::test]
    async fn text_source_becomes_direct_text() {
        let input = read_input(SuggestSource::Text("A: hi".to_string())).await.unwrap();
        assert_eq!(input.source(), InputSource::DirectText);
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let err = read_input(SuggestSource::Text("  ".to_string())).await.unwrap_err();
        assert!(err.to_string().contains("text"));
    }

    #[tokio::test]
    async fn image_source_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let input = read_input(SuggestSource::Image(path)).await.unwrap();
        assert_eq!(input.source(), InputSource::Screenshot);
    }

    #[tokio::test]
    async fn missing_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_input(SuggestSource::Image(dir.path().join("nope.png")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("nope.png"));
    }
}
