/*!
 * Error types for the vttwai application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether a request that failed with this error may succeed when sent again
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RequestFailed(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

/// Errors that can occur while building, reading or writing subtitles
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Transcript timings that break the ordering the segmenter relies on
    #[error("Malformed transcript: {0}")]
    MalformedInput(String),

    /// A caption file that could not be read as WebVTT
    #[error("Failed to parse subtitles: {0}")]
    Parse(String),

    /// Writing a caption artifact failed
    #[error("Failed to write subtitles to {path}: {message}")]
    Serialization {
        /// Destination of the artifact
        path: String,
        /// Underlying cause
        message: String,
    },
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error with subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// The backend returned a different number of texts than it was sent
    #[error("Expected {expected} translated texts, got {actual}")]
    LengthMismatch {
        /// Number of texts sent
        expected: usize,
        /// Number of texts received
        actual: usize,
    },

    /// A translation job ran past its deadline
    #[error("Translation to '{language}' timed out after {seconds}s")]
    Timeout {
        /// Target language of the job
        language: String,
        /// Deadline in seconds
        seconds: u64,
    },

    /// A translation job panicked or was cancelled
    #[error("Translation job aborted: {0}")]
    JobAborted(String),

    /// Unsupported or invalid target language
    #[error("Invalid language: {0}")]
    Language(String),
}
