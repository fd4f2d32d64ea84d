use std::fmt;
use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use reqwest::{Client, StatusCode};
use log::{error, warn};

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Longest wait between two retries
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// DeepL client for the v2 REST API
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL, e.g. `https://api-free.deepl.com`
    endpoint: String,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

impl fmt::Debug for DeepL {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepL")
            .field("endpoint", &self.endpoint)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish_non_exhaustive()
    }
}

/// Translate request; DeepL accepts up to 50 texts per call
#[derive(Debug, Clone, Serialize)]
pub struct DeepLRequest {
    /// Texts to translate
    text: Vec<String>,

    /// Upper-case target language code, e.g. `DE` or `PT-BR`
    target_lang: String,

    /// Source language; detected by the API when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,

    /// Keep punctuation and casing the way they were sent
    #[serde(skip_serializing_if = "Option::is_none")]
    preserve_formatting: Option<bool>,

    /// Treat `<u>` and friends as markup instead of text
    #[serde(skip_serializing_if = "Option::is_none")]
    tag_handling: Option<String>,
}

impl DeepLRequest {
    /// Create a new translate request
    pub fn new(text: Vec<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text,
            target_lang: target_lang.into(),
            source_lang: None,
            preserve_formatting: Some(true),
            tag_handling: None,
        }
    }

    /// Set the source language
    pub fn source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = Some(source_lang.into());
        self
    }

    /// Treat the texts as HTML so inline tags survive translation
    pub fn html_tags(mut self) -> Self {
        self.tag_handling = Some("html".to_string());
        self
    }

    /// Number of texts in this request
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// One translated text
#[derive(Debug, Clone, Deserialize)]
pub struct DeepLTranslation {
    /// Language DeepL detected in the source text
    #[serde(default)]
    pub detected_source_language: String,
    /// Translated text
    pub text: String,
}

/// Translate response
#[derive(Debug, Clone, Deserialize)]
pub struct DeepLResponse {
    pub translations: Vec<DeepLTranslation>,
}

impl DeepL {
    /// Create a new DeepL client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self::new_with_config(api_key, endpoint, 30, 3, 1000)
    }

    /// Create a new DeepL client with timeout and retry configuration
    pub fn new_with_config(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            max_retries,
            backoff_base_ms,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.trim_end_matches('/'), path)
    }

    /// Map a non-success HTTP status to a provider error
    fn status_error(status: StatusCode, body: String) -> ProviderError {
        match status.as_u16() {
            401 | 403 => ProviderError::AuthenticationError(body),
            429 => ProviderError::RateLimitExceeded(body),
            code => ProviderError::ApiError {
                status_code: code,
                message: body,
            },
        }
    }

    /// Delay before retry number `attempt` (1-based): the base doubled per
    /// attempt, capped at [`MAX_BACKOFF_MS`]
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor).min(MAX_BACKOFF_MS))
    }

    /// Send one translate request without retrying
    async fn send_once(&self, request: &DeepLRequest) -> Result<DeepLResponse, ProviderError> {
        let response = self
            .client
            .post(self.url("/v2/translate"))
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(Self::status_error(status, error_text));
        }

        response
            .json::<DeepLResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl Provider for DeepL {
    type Request = DeepLRequest;
    type Response = DeepLResponse;

    /// Translate with retries on network, rate-limit and server errors
    async fn complete(&self, request: DeepLRequest) -> Result<DeepLResponse, ProviderError> {
        let mut attempt = 0;

        loop {
            match self.send_once(&request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let backoff = self.backoff_delay(attempt);
                    warn!(
                        "DeepL request failed: {} - retrying in {}ms (attempt {}/{})",
                        e, backoff.as_millis(), attempt + 1, self.max_retries + 1
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    error!("DeepL API error: {}", e);
                    return Err(e);
                }
            }
        }
    }

    /// Check credentials against the usage endpoint
    async fn test_connection(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .get(self.url("/v2/usage"))
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Self::status_error(status, body))
        }
    }

    fn extract_texts(response: &DeepLResponse) -> Vec<String> {
        response.translations.iter().map(|t| t.text.clone()).collect()
    }
}
