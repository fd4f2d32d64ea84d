/*!
 * Integration tests for the application controller
 */

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use vttwai::app_config::{Config, TranslationProvider};
use vttwai::app_controller::Controller;
use vttwai::segmentation::SegmentationOptions;
use vttwai::subtitle_processor::CaptionSet;
use crate::common::{self, ScriptedTranslator};

const TRANSCRIPT_JSON: &str = r#"{"language":"en","segments":[
    {"start":0.0,"end":0.5,"text":"Hello","words":[{"word":"Hello","start":0.0,"end":0.5}]},
    {"start":4.0,"end":4.5,"text":" world","words":[{"word":" world","start":4.0,"end":4.5}]}
]}"#;

fn controller_with_server(server_url: &str) -> Controller {
    let mut config = Config::default();
    config.output.server_url = server_url.to_string();
    config.translation.provider = TranslationProvider::Mock;
    Controller::with_config(config)
}

fn default_options() -> SegmentationOptions {
    Config::default().subtitles.segmentation_options()
}

#[tokio::test]
async fn test_generate_subtitles_withTranscriptJson_shouldWriteArtifact() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "talk.json", TRANSCRIPT_JSON)?;
    let output_dir = temp_dir.path().join("upload_files");
    let controller = controller_with_server("https://example.org");

    let artifact = controller
        .generate_subtitles(&input, &output_dir, &default_options(), false)
        .await?;

    assert_eq!(artifact.path, output_dir.join("talk-subtitles.vtt"));
    assert_eq!(artifact.locator, "https://example.org/upload_files/talk-subtitles.vtt");
    assert_eq!(artifact.language, "en");
    assert_eq!(artifact.cue_count, 2);
    assert_eq!(
        std::fs::read_to_string(&artifact.path)?,
        "WEBVTT\n\n\
         00:00:00.000 --> 00:00:00.500 align:middle\nHello\n\n\
         00:00:04.000 --> 00:00:04.500 align:middle\nworld\n\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_generate_subtitles_withExistingOutput_shouldRequireForce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "talk.json", TRANSCRIPT_JSON)?;
    let controller = controller_with_server("");
    common::create_test_file(temp_dir.path(), "talk-subtitles.vtt", "WEBVTT\n\n")?;

    let refused = controller
        .generate_subtitles(&input, temp_dir.path(), &default_options(), false)
        .await;
    let forced = controller
        .generate_subtitles(&input, temp_dir.path(), &default_options(), true)
        .await?;

    assert!(refused.is_err());
    assert_eq!(forced.cue_count, 2);
    Ok(())
}

#[tokio::test]
async fn test_generate_subtitles_withMalformedTranscript_shouldFailWithoutOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(
        temp_dir.path(),
        "broken.json",
        r#"{"segments":[{"start":2.0,"end":1.0,"words":[{"word":"x","start":2.0,"end":1.0}]}]}"#,
    )?;
    let controller = controller_with_server("");

    let result = controller
        .generate_subtitles(&input, temp_dir.path(), &default_options(), false)
        .await;

    assert!(result.is_err());
    assert!(!temp_dir.path().join("broken-subtitles.vtt").exists());
    Ok(())
}

#[tokio::test]
async fn test_load_transcript_withUnsupportedInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "notes.txt", "hello")?;
    let controller = Controller::new_for_test();

    assert!(controller.load_transcript(&input).await.is_err());
    assert!(controller.load_transcript(&temp_dir.path().join("missing.json")).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_translate_subtitles_withMockProvider_shouldTranslateVttFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let vtt = common::create_test_vtt(temp_dir.path(), "talk.vtt")?;
    let controller = controller_with_server("http://localhost:5000");

    let result = controller
        .translate_subtitles(&vtt, &["de".to_string(), "es".to_string()])
        .await?;

    assert_eq!(result.len(), 2);
    assert_eq!(result.locator_by_language["es"], "http://localhost:5000/upload_files/talk_es.vtt");

    let german = CaptionSet::from_file(temp_dir.path().join("talk_de.vtt"))?;
    assert_eq!(german.styles.len(), 1);
    assert_eq!(german.cues[0].text, "[DE] This is a test subtitle.");
    Ok(())
}

#[tokio::test]
async fn test_cleanup_artifacts_withConfiguredDelay_shouldRemoveFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let vtt = common::create_test_vtt(temp_dir.path(), "talk.vtt")?;
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Mock;
    config.output.cleanup_after_secs = Some(0);
    let controller = Controller::with_config(config);

    let result = controller.translate_subtitles(&vtt, &["de".to_string()]).await?;
    let mut artifacts: Vec<_> = result.path_by_language.into_values().collect();
    artifacts.push(vtt.clone());
    controller.cleanup_artifacts(artifacts.clone()).await;

    assert_eq!(artifacts.len(), 2);
    assert!(artifacts.iter().all(|p| !p.exists()));
    Ok(())
}

#[tokio::test]
async fn test_cleanup_artifacts_withoutDelay_shouldKeepFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let vtt = common::create_test_vtt(temp_dir.path(), "talk.vtt")?;
    let controller = controller_with_server("");

    controller.cleanup_artifacts(vec![vtt.clone()]).await;

    assert!(vtt.exists());
    Ok(())
}

#[tokio::test]
async fn test_translate_caption_set_with_withFailingLanguage_shouldReportProgressForAll() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::sample_caption_set(temp_dir.path());
    let controller = controller_with_server("");
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let result = controller
        .translate_caption_set_with(
            source,
            &["de".to_string(), "fr".to_string(), "es".to_string()],
            Arc::new(ScriptedTranslator::failing_for(&["es"])),
            move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        )
        .await;

    assert_eq!(result.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    Ok(())
}
