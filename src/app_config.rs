use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::segmentation::{SegmentationOptions, DEFAULT_PAUSE_THRESHOLD_SECS};

/// Upper bound for `translation.retry_count`
pub const MAX_RETRY_COUNT: u32 = 10;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Cue layout settings
    #[serde(default)]
    pub subtitles: SubtitleConfig,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Speech-to-text config
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Where artifacts go and how they are addressed
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: DeepL REST API
    #[default]
    DeepL,
    // @provider: Offline mock, echoes tagged text
    Mock,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::DeepL => "DeepL",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::DeepL => "deepl".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "deepl" => Ok(Self::DeepL),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Cue layout settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubtitleConfig {
    /// Characters per line; `null` disables wrapping
    #[serde(default = "default_max_line_width")]
    pub max_line_width: Option<usize>,

    /// Lines per cue; `null` keeps one cue per transcript segment
    #[serde(default = "default_max_line_count")]
    pub max_line_count: Option<usize>,

    /// Emit one cue per word with the spoken word underlined
    #[serde(default)]
    pub highlight_words: bool,

    /// Silence, in seconds, that starts a new cue
    #[serde(default = "default_pause_threshold_secs")]
    pub pause_threshold_secs: f64,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            max_line_width: default_max_line_width(),
            max_line_count: default_max_line_count(),
            highlight_words: false,
            pause_threshold_secs: default_pause_threshold_secs(),
        }
    }
}

impl SubtitleConfig {
    /// Segmentation options for these settings
    pub fn segmentation_options(&self) -> SegmentationOptions {
        SegmentationOptions {
            max_line_width: self.max_line_width,
            max_line_count: self.max_line_count,
            highlight_words: self.highlight_words,
            pause_threshold_secs: self.pause_threshold_secs,
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// API key; falls back to the DEEPL_KEY environment variable
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service URL
    #[serde(default = "default_deepl_endpoint")]
    pub endpoint: String,

    /// Max subtitle characters per request
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    /// Max concurrent requests inside one language job
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Deadline for a whole language job; `None` waits indefinitely
    #[serde(default)]
    pub job_timeout_secs: Option<u64>,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            api_key: String::new(),
            endpoint: default_deepl_endpoint(),
            max_chars_per_request: default_max_chars_per_request(),
            concurrent_requests: default_concurrent_requests(),
            timeout_secs: default_timeout_secs(),
            job_timeout_secs: None,
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl TranslationConfig {
    /// Get the API key, from config or environment
    pub fn get_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        std::env::var("DEEPL_KEY").unwrap_or_default()
    }

    /// Get the endpoint, falling back to the public API
    pub fn get_endpoint(&self) -> String {
        if self.endpoint.is_empty() {
            default_deepl_endpoint()
        } else {
            self.endpoint.clone()
        }
    }
}

/// Speech-to-text backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionBackendKind {
    /// OpenAI-compatible `/v1/audio/transcriptions` server
    #[default]
    WhisperApi,
}

/// Speech-to-text configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranscriptionConfig {
    #[serde(default)]
    pub backend: TranscriptionBackendKind,

    /// Server base URL
    #[serde(default = "default_whisper_endpoint")]
    pub endpoint: String,

    /// API key; falls back to the OPENAI_API_KEY environment variable
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Model name
    #[serde(default = "default_whisper_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_transcription_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            backend: TranscriptionBackendKind::default(),
            endpoint: default_whisper_endpoint(),
            api_key: String::new(),
            model: default_whisper_model(),
            timeout_secs: default_transcription_timeout_secs(),
        }
    }
}

impl TranscriptionConfig {
    pub fn get_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        std::env::var("OPENAI_API_KEY").unwrap_or_default()
    }
}

/// Artifact placement
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Public base URL artifacts are served from; falls back to SERVER_URL
    #[serde(default = "String::new")]
    pub server_url: String,

    /// Directory artifacts are written to
    #[serde(default = "default_upload_folder")]
    pub upload_folder: String,

    /// Seconds after which produced artifacts are removed; `None` keeps them
    #[serde(default)]
    pub cleanup_after_secs: Option<u64>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            upload_folder: default_upload_folder(),
            cleanup_after_secs: None,
        }
    }
}

impl OutputConfig {
    pub fn get_server_url(&self) -> String {
        if !self.server_url.is_empty() {
            return self.server_url.clone();
        }
        std::env::var("SERVER_URL").unwrap_or_default()
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_max_line_width() -> Option<usize> {
    Some(28)
}

fn default_max_line_count() -> Option<usize> {
    Some(2)
}

fn default_pause_threshold_secs() -> f64 {
    DEFAULT_PAUSE_THRESHOLD_SECS
}

fn default_concurrent_requests() -> usize {
    2
}

fn default_max_chars_per_request() -> usize {
    4000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_transcription_timeout_secs() -> u64 {
    300
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_deepl_endpoint() -> String {
    "https://api-free.deepl.com".to_string()
}

fn default_whisper_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_whisper_model() -> String {
    "whisper-1".to_string()
}

fn default_upload_folder() -> String {
    "./upload_files".to_string()
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration, writing the defaults first if the file does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        log::warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Save configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.subtitles.max_line_width == Some(0) {
            return Err(anyhow!("subtitles.max_line_width must be at least 1"));
        }
        if self.subtitles.max_line_count == Some(0) {
            return Err(anyhow!("subtitles.max_line_count must be at least 1"));
        }
        if !self.subtitles.pause_threshold_secs.is_finite() || self.subtitles.pause_threshold_secs < 0.0 {
            return Err(anyhow!("subtitles.pause_threshold_secs must be a non-negative number"));
        }

        if self.translation.concurrent_requests == 0 {
            return Err(anyhow!("translation.concurrent_requests must be at least 1"));
        }
        if self.translation.retry_count > MAX_RETRY_COUNT {
            return Err(anyhow!("translation.retry_count must be at most {}", MAX_RETRY_COUNT));
        }
        if self.translation.max_chars_per_request == 0 {
            return Err(anyhow!("translation.max_chars_per_request must be at least 1"));
        }

        if self.translation.provider == TranslationProvider::DeepL {
            url::Url::parse(&self.translation.get_endpoint())
                .with_context(|| format!("Invalid translation endpoint: {}", self.translation.endpoint))?;
        }

        url::Url::parse(&self.transcription.endpoint)
            .with_context(|| format!("Invalid transcription endpoint: {}", self.transcription.endpoint))?;

        Ok(())
    }

    /// Validate that the translation backend can be reached with the current credentials
    pub fn validate_for_translation(&self) -> Result<()> {
        self.validate()?;
        if self.translation.provider == TranslationProvider::DeepL && self.translation.get_api_key().is_empty() {
            return Err(anyhow!("Translation API key is required for DeepL provider (set translation.api_key or DEEPL_KEY)"));
        }
        Ok(())
    }
}
