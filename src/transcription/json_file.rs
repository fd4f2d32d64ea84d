use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use std::path::Path;

use crate::transcript::TranscriptResult;
use crate::transcription::TranscriptionBackend;

/// Reads a transcript that was produced earlier and stored as JSON.
///
/// Accepts the faster-whisper layout: `segments` with nested `words`, each word
/// carrying its text under `word` or `text`.
pub struct JsonTranscriptBackend;

#[async_trait]
impl TranscriptionBackend for JsonTranscriptBackend {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn transcribe(&self, path: &Path) -> Result<TranscriptResult> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read transcript: {}", path.display()))?;

        let mut result = TranscriptResult::from_json_str(&content)?;
        if result.full_text.is_empty() {
            result.full_text = result.segments.iter().map(|s| s.text.as_str()).collect();
        }

        debug!("Loaded {} segments from {}", result.segments.len(), path.display());
        Ok(result)
    }
}
