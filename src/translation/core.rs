/*!
 * Core translation service implementation.
 *
 * This module contains the TranslationService struct, which translates caption
 * texts through the configured provider. Texts are sent in character-bounded
 * chunks, several chunks in flight at once, and reassembled in order.
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use log::debug;
use std::time::Instant;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::deepl::{DeepL, DeepLRequest};
use crate::providers::mock::{MockProvider, MockRequest};
use crate::providers::Provider;
use crate::subtitle_processor::chunk_ranges;

/// Anything that can translate a list of caption texts into one language.
///
/// The returned texts are in the same order and of the same number as the
/// input texts.
#[async_trait]
pub trait CaptionTranslator: Send + Sync {
    async fn translate_texts(&self, texts: &[String], target_language: &str) -> Result<Vec<String>, TranslationError>;
}

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// DeepL REST API
    DeepL {
        /// Client instance
        client: DeepL,
    },

    /// Offline mock
    Mock {
        /// Client instance
        client: MockProvider,
    },
}

/// Main translation service for caption translation
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let provider = match config.provider {
            ConfigTranslationProvider::DeepL => {
                let api_key = config.get_api_key();
                if api_key.is_empty() {
                    return Err(anyhow!("DeepL requires an API key (translation.api_key or DEEPL_KEY)"));
                }

                TranslationProviderImpl::DeepL {
                    client: DeepL::new_with_config(
                        api_key,
                        config.get_endpoint(),
                        config.timeout_secs,
                        config.retry_count,
                        config.retry_backoff_ms,
                    ),
                }
            }
            ConfigTranslationProvider::Mock => TranslationProviderImpl::Mock {
                client: MockProvider::working(),
            },
        };

        Ok(Self { provider, config })
    }

    /// Create a service backed by the given mock provider
    pub fn with_mock(client: MockProvider, config: TranslationConfig) -> Self {
        Self {
            provider: TranslationProviderImpl::Mock { client },
            config,
        }
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<(), TranslationError> {
        match &self.provider {
            TranslationProviderImpl::DeepL { client } => client.test_connection().await?,
            TranslationProviderImpl::Mock { client } => client.test_connection().await?,
        }
        Ok(())
    }

    /// Send one chunk to the provider
    async fn translate_chunk(&self, texts: Vec<String>, backend_code: &str) -> Result<Vec<String>, TranslationError> {
        let expected = texts.len();
        let start_time = Instant::now();

        let translated = match &self.provider {
            TranslationProviderImpl::DeepL { client } => {
                // Highlighted captions carry <u> markup
                let has_markup = texts.iter().any(|t| t.contains("<u>"));
                let mut request = DeepLRequest::new(texts, backend_code);
                if has_markup {
                    request = request.html_tags();
                }
                let response = client.complete(request).await?;
                DeepL::extract_texts(&response)
            }
            TranslationProviderImpl::Mock { client } => {
                let request = MockRequest {
                    texts,
                    target_language: backend_code.to_string(),
                };
                let response = client.complete(request).await?;
                MockProvider::extract_texts(&response)
            }
        };

        debug!("Translated {} texts to {} in {:?}", expected, backend_code, start_time.elapsed());

        if translated.len() != expected {
            return Err(TranslationError::LengthMismatch {
                expected,
                actual: translated.len(),
            });
        }

        Ok(translated)
    }
}

#[async_trait]
impl CaptionTranslator for TranslationService {
    async fn translate_texts(&self, texts: &[String], target_language: &str) -> Result<Vec<String>, TranslationError> {
        let backend_code = language_utils::to_backend_code(target_language)
            .map_err(|e| TranslationError::Language(e.to_string()))?;

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let chunks = chunk_ranges(texts.iter().map(|t| t.chars().count()), self.config.max_chars_per_request);
        let backend_code = backend_code.as_str();

        let translated: Vec<Vec<String>> = stream::iter(chunks)
            .map(|range| self.translate_chunk(texts[range].to_vec(), backend_code))
            .buffered(self.config.concurrent_requests.max(1))
            .try_collect()
            .await?;

        Ok(translated.into_iter().flatten().collect())
    }
}
