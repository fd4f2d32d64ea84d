/*!
 * Speech-to-text backends.
 *
 * A backend turns a media file (or an earlier transcript) into a
 * [`TranscriptResult`] with segment and, when available, word timings.
 */

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use crate::app_config::{TranscriptionBackendKind, TranscriptionConfig};
use crate::transcript::TranscriptResult;

pub mod json_file;
pub mod whisper_api;

pub use self::json_file::JsonTranscriptBackend;
pub use self::whisper_api::WhisperApiBackend;

#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    fn name(&self) -> &str;
    async fn transcribe(&self, path: &Path) -> Result<TranscriptResult>;
}

/// Build the backend selected in the configuration
pub fn backend_from_config(config: &TranscriptionConfig) -> Result<Box<dyn TranscriptionBackend>> {
    match config.backend {
        TranscriptionBackendKind::WhisperApi => Ok(Box::new(WhisperApiBackend::new(config)?)),
    }
}
