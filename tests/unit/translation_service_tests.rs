/*!
 * Tests for the translation service
 */

use anyhow::Result;
use vttwai::app_config::{TranslationConfig, TranslationProvider};
use vttwai::errors::{ProviderError, TranslationError};
use vttwai::providers::mock::MockProvider;
use vttwai::translation::{CaptionTranslator, TranslationService};

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|t| t.to_string()).collect()
}

fn small_chunks() -> TranslationConfig {
    TranslationConfig {
        provider: TranslationProvider::Mock,
        max_chars_per_request: 8,
        concurrent_requests: 2,
        ..TranslationConfig::default()
    }
}

#[test]
fn test_new_withDeepLAndNoKey_shouldFail() {
    let config = TranslationConfig {
        api_key: String::new(),
        ..TranslationConfig::default()
    };

    if std::env::var("DEEPL_KEY").is_err() {
        assert!(TranslationService::new(config).is_err());
    }
}

#[test]
fn test_new_withMockProvider_shouldSucceed() {
    let config = TranslationConfig {
        provider: TranslationProvider::Mock,
        ..TranslationConfig::default()
    };

    assert!(TranslationService::new(config).is_ok());
}

#[tokio::test]
async fn test_translate_texts_withSmallBudget_shouldBatchAndKeepOrder() -> Result<()> {
    let provider = MockProvider::working();
    let service = TranslationService::with_mock(provider.clone(), small_chunks());

    let translated = service
        .translate_texts(&texts(&["aaaa", "bbbb", "cccc", "dddd", "eeeeeeeeee"]), "pt-br")
        .await?;

    assert_eq!(
        translated,
        vec!["[PT-BR] aaaa", "[PT-BR] bbbb", "[PT-BR] cccc", "[PT-BR] dddd", "[PT-BR] eeeeeeeeee"]
    );
    assert_eq!(provider.request_count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_translate_texts_withEmptyInput_shouldNotCallProvider() -> Result<()> {
    let provider = MockProvider::working();
    let service = TranslationService::with_mock(provider.clone(), small_chunks());

    let translated = service.translate_texts(&[], "de").await?;

    assert!(translated.is_empty());
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_translate_texts_withFailingLanguage_shouldReturnProviderError() {
    let service = TranslationService::with_mock(MockProvider::failing_for("de"), small_chunks());

    let failed = service.translate_texts(&texts(&["Hi"]), "DE").await;
    let succeeded = service.translate_texts(&texts(&["Hi"]), "fr").await;

    assert!(matches!(failed, Err(TranslationError::Provider(ProviderError::ApiError { .. }))));
    assert_eq!(succeeded.unwrap(), vec!["[FR] Hi"]);
}

#[tokio::test]
async fn test_test_connection_withFailingProvider_shouldFail() {
    let service = TranslationService::with_mock(MockProvider::failing(), small_chunks());

    assert!(service.test_connection().await.is_err());
}
