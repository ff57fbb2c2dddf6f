//! Optical Character Recognition (OCR)
//!
//! Bridges the Tesseract CLI to extract conversation text from chat
//! screenshots. The image is streamed over stdin and never touches disk.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use charmline_core::{ExtractionError, LanguageHints, OcrBackend, UploadedImage};

use crate::image::sniff_image_mime;

/// OCR backend that shells out to the `tesseract` binary.
pub struct TesseractBackend {
    binary: PathBuf,
    tessdata_dir: Option<PathBuf>,
}

impl TesseractBackend {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            tessdata_dir: None,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Directory holding the `*.traineddata` language files.
    pub fn with_tessdata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tessdata_dir = Some(dir.into());
        self
    }

    fn command(&self, languages: &LanguageHints) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("stdin").arg("stdout").arg("-l").arg(languages.to_spec());
        if let Some(dir) = &self.tessdata_dir {
            cmd.arg("--tessdata-dir").arg(dir);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // An abandoned request must not leave the engine running.
            .kill_on_drop(true);
        cmd
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrBackend for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(
        &self,
        image: &[u8],
        languages: &LanguageHints,
    ) -> Result<String, ExtractionError> {
        let mut child = self.command(languages).spawn().map_err(|e| {
            ExtractionError::BackendUnavailable {
                backend: self.binary.display().to_string(),
                message: e.to_string(),
            }
        })?;

        let mut stdin = child.stdin.take().ok_or_else(|| ExtractionError::BackendUnavailable {
            backend: self.binary.display().to_string(),
            message: "stdin was not captured".to_string(),
        })?;

        let write = async move {
            stdin.write_all(image).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            return Err(ExtractionError::BackendFailed {
                backend: self.name().to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // Tesseract may close stdin early once it has read the header; only a
        // failed write with a failed exit is an error.
        if let Err(e) = written {
            debug!(error = %e, "OCR stdin closed before the full image was written");
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Converts uploaded screenshots into trimmed text using an [`OcrBackend`].
#[derive(Clone)]
pub struct TextExtractor {
    backend: Arc<dyn OcrBackend>,
    languages: LanguageHints,
}

impl TextExtractor {
    pub fn new(backend: Arc<dyn OcrBackend>) -> Self {
        Self {
            backend,
            languages: LanguageHints::default(),
        }
    }

    pub fn with_languages(mut self, languages: LanguageHints) -> Self {
        self.languages = languages;
        self
    }

    pub fn languages(&self) -> &LanguageHints {
        &self.languages
    }

    /// Extract text using the configured language hints.
    pub async fn extract(&self, image: &UploadedImage) -> Result<String, ExtractionError> {
        self.extract_with(image, &self.languages).await
    }

    /// Extract text with explicit language hints.
    ///
    /// An image without recognizable text yields an empty string, not an error.
    pub async fn extract_with(
        &self,
        image: &UploadedImage,
        languages: &LanguageHints,
    ) -> Result<String, ExtractionError> {
        if image.is_empty() {
            return Err(ExtractionError::EmptyImage);
        }

        let mime = sniff_image_mime(image.as_bytes());
        if mime.is_none() {
            warn!(bytes = image.len(), "Upload does not look like a known raster format");
        }
        info!(
            backend = self.backend.name(),
            bytes = image.len(),
            mime = mime.unwrap_or("unknown"),
            languages = %languages.to_spec(),
            "Running OCR on screenshot"
        );

        let raw = self.backend.recognize(image.as_bytes(), languages).await?;
        let text = raw.trim().to_string();
        debug!(chars = text.chars().count(), "OCR finished");
        Ok(text)
    }
}

enum MockOcrBehavior {
    Text(String),
    Fail(String),
}

/// An OCR backend that returns canned text and counts its calls.
pub struct MockOcrBackend {
    behavior: MockOcrBehavior,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockOcrBackend {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            behavior: MockOcrBehavior::Text(text.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A backend whose every call fails with the given stderr.
    pub fn failing(stderr: impl Into<String>) -> Self {
        Self {
            behavior: MockOcrBehavior::Fail(stderr.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrBackend for MockOcrBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn recognize(
        &self,
        _image: &[u8],
        _languages: &LanguageHints,
    ) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.behavior {
            MockOcrBehavior::Text(text) => Ok(text.clone()),
            MockOcrBehavior::Fail(stderr) => Err(ExtractionError::BackendFailed {
                backend: "mock".to_string(),
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
        }
    }
}
