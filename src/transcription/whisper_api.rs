use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart;
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::app_config::TranscriptionConfig;
use crate::language_utils;
use crate::transcript::{Segment, TranscriptResult, Word};
use crate::transcription::TranscriptionBackend;

/// Client for an OpenAI-compatible `/v1/audio/transcriptions` endpoint
pub struct WhisperApiBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct VerboseWord {
    word: String,
    start: f64,
    end: f64,
}

#[derive(Debug, Deserialize)]
struct VerboseSegment {
    start: f64,
    end: f64,
    #[serde(default)]
    text: String,
}

/// `response_format=verbose_json` body
#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    language: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    segments: Vec<VerboseSegment>,
    #[serde(default)]
    words: Vec<VerboseWord>,
}

impl WhisperApiBackend {
    pub fn new(config: &TranscriptionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.get_api_key(),
            model: config.model.clone(),
        })
    }

    fn mime_type(path: &Path) -> &'static str {
        match path.extension().map(|e| e.to_string_lossy().to_lowercase()).as_deref() {
            Some("mp3") => "audio/mpeg",
            Some("m4a") => "audio/mp4",
            Some("mp4") => "video/mp4",
            Some("mov") => "video/quicktime",
            Some("wav") => "audio/wav",
            _ => "application/octet-stream",
        }
    }
}

/// Turn a verbose response into a transcript.
///
/// The API returns words in one flat list; each word is placed in the last
/// segment that starts at or before it.
fn into_transcript(response: VerboseTranscription) -> TranscriptResult {
    let mut segments: Vec<Segment> = response
        .segments
        .into_iter()
        .map(|s| Segment::without_words(s.start, s.end, s.text))
        .collect();

    if segments.is_empty() && !response.words.is_empty() {
        segments.push(Segment::default());
    }

    let mut seg_idx = 0;
    for word in response.words {
        while seg_idx + 1 < segments.len() && segments[seg_idx + 1].start <= word.start {
            seg_idx += 1;
        }

        // Recognizers separate words with a leading space; some servers strip it
        let text = if word.word.starts_with(char::is_whitespace) {
            word.word
        } else {
            format!(" {}", word.word)
        };
        segments[seg_idx].words.push(Word::new(text, word.start, word.end));
    }

    for segment in segments.iter_mut().filter(|s| s.text.is_empty() && !s.words.is_empty()) {
        *segment = Segment::from_words(std::mem::take(&mut segment.words));
    }

    let language = language_utils::language_label_to_code(&response.language).unwrap_or_else(|| {
        if !response.language.is_empty() {
            warn!("Unknown transcript language '{}'", response.language);
        }
        response.language.clone()
    });

    let mut result = TranscriptResult::new(segments, language);
    if !response.text.is_empty() {
        result.full_text = response.text;
    }
    result
}

#[async_trait]
impl TranscriptionBackend for WhisperApiBackend {
    fn name(&self) -> &str {
        "whisper-api"
    }

    async fn transcribe(&self, path: &Path) -> Result<TranscriptResult> {
        let url = format!("{}/v1/audio/transcriptions", self.endpoint);

        let file_bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read media file: {}", path.display()))?;
        let filename = path
            .file_name()
            .ok_or_else(|| anyhow!("media path has no filename: {}", path.display()))?
            .to_string_lossy()
            .to_string();

        let form = multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(file_bytes)
                    .file_name(filename.clone())
                    .mime_str(Self::mime_type(path))?,
            )
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word")
            .text("timestamp_granularities[]", "segment");

        let start_time = Instant::now();
        info!("Transcribing {} with {}", filename, self.model);

        let mut request = self.client.post(&url).multipart(form);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Transcription request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Transcription API responded with {}: {}", status, body));
        }

        let body: VerboseTranscription = response
            .json()
            .await
            .context("Failed to parse transcription response")?;

        let result = into_transcript(body);
        debug!(
            "Transcribed {} into {} segments in {:?}",
            filename,
            result.segments.len(),
            start_time.elapsed()
        );

        Ok(result)
    }
}
