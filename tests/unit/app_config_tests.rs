/*!
 * Tests for application configuration
 */

use anyhow::Result;
use vttwai::app_config::{Config, LogLevel, MAX_RETRY_COUNT, TranscriptionBackendKind, TranslationProvider};
use crate::common;

#[test]
fn test_default_config_shouldUseDocumentedDefaults() {
    let config = Config::default();

    assert_eq!(config.subtitles.max_line_width, Some(28));
    assert_eq!(config.subtitles.max_line_count, Some(2));
    assert!(!config.subtitles.highlight_words);
    assert_eq!(config.subtitles.pause_threshold_secs, 3.0);
    assert_eq!(config.translation.provider, TranslationProvider::DeepL);
    assert_eq!(config.translation.endpoint, "https://api-free.deepl.com");
    assert_eq!(config.translation.job_timeout_secs, None);
    assert_eq!(config.transcription.backend, TranscriptionBackendKind::WhisperApi);
    assert_eq!(config.output.upload_folder, "./upload_files");
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_segmentation_options_withDefaults_shouldDisableSegmentPreservation() {
    let options = Config::default().subtitles.segmentation_options();

    assert_eq!(options.max_line_width, Some(28));
    assert_eq!(options.max_line_count, Some(2));
    assert!(!options.preserve_segments());
}

#[test]
fn test_config_from_json_withPartialSections_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "subtitles": { "max_line_count": null, "highlight_words": true },
            "translation": { "provider": "mock", "job_timeout_secs": 90 },
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::from_file(&path)?;

    assert_eq!(config.subtitles.max_line_width, Some(28));
    assert_eq!(config.subtitles.max_line_count, None);
    assert!(config.subtitles.highlight_words);
    assert!(config.subtitles.segmentation_options().preserve_segments());
    assert_eq!(config.translation.provider, TranslationProvider::Mock);
    assert_eq!(config.translation.job_timeout_secs, Some(90));
    assert_eq!(config.translation.max_chars_per_request, 4000);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let created = Config::load_or_create(&path)?;
    let reloaded = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(created.subtitles, reloaded.subtitles);
    assert_eq!(created.translation.endpoint, reloaded.translation.endpoint);
    Ok(())
}

#[test]
fn test_validate_withZeroLimits_shouldFail() {
    let mut config = Config::default();
    config.subtitles.max_line_width = Some(0);
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.subtitles.max_line_count = Some(0);
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.translation.concurrent_requests = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.subtitles.pause_threshold_secs = -1.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withExcessiveRetryCount_shouldFail() {
    let mut config = Config::default();
    config.translation.retry_count = MAX_RETRY_COUNT;
    assert!(config.validate().is_ok());

    config.translation.retry_count = 70;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_from_json_withCleanupDelay_shouldReadIt() -> Result<()> {
    let config: Config = serde_json::from_str(r#"{"output":{"cleanup_after_secs":300}}"#)?;

    assert_eq!(config.output.cleanup_after_secs, Some(300));
    assert_eq!(config.output.upload_folder, "./upload_files");
    assert_eq!(Config::default().output.cleanup_after_secs, None);
    Ok(())
}

#[test]
fn test_validate_withInvalidEndpoint_shouldFail() {
    let mut config = Config::default();
    config.transcription.endpoint = "not a url".to_string();

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_for_translation_withMockProvider_shouldNotNeedKey() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Mock;

    assert!(config.validate_for_translation().is_ok());
}

#[test]
fn test_translation_provider_fromStr_shouldIgnoreCase() {
    assert_eq!("DeepL".parse::<TranslationProvider>().unwrap(), TranslationProvider::DeepL);
    assert_eq!("MOCK".parse::<TranslationProvider>().unwrap(), TranslationProvider::Mock);
    assert!("ollama".parse::<TranslationProvider>().is_err());
    assert_eq!(TranslationProvider::DeepL.to_string(), "deepl");
}
