/*!
 * Integration tests for the transcript to WebVTT workflow
 */

use anyhow::Result;
use vttwai::segmentation::{SegmentationOptions, segment_cues};
use vttwai::subtitle_processor::{CaptionSet, Cue, write_cues_to_vtt};
use vttwai::transcript::TranscriptResult;
use vttwai::transcription::{JsonTranscriptBackend, TranscriptionBackend};
use crate::common;

const TRANSCRIPT_JSON: &str = r#"{
    "language": "en",
    "segments": [
        {"start": 0.0, "end": 2.1, "text": " Welcome to the show.", "words": [
            {"word": " Welcome", "start": 0.0, "end": 0.6},
            {"word": " to", "start": 0.6, "end": 0.8},
            {"word": " the", "start": 0.8, "end": 1.0},
            {"word": " show.", "start": 1.0, "end": 2.1}
        ]},
        {"start": 6.0, "end": 8.0, "text": " Today we talk about rust.", "words": [
            {"word": " Today", "start": 6.0, "end": 6.4},
            {"word": " we", "start": 6.4, "end": 6.6},
            {"word": " talk", "start": 6.6, "end": 7.0},
            {"word": " about", "start": 7.0, "end": 7.4},
            {"word": " rust.", "start": 7.4, "end": 8.0}
        ]}
    ]
}"#;

/// Segment, write, read back
#[test]
fn test_subtitle_workflow_withDefaultLayout_shouldWriteReadableVtt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let transcript = TranscriptResult::from_json_str(TRANSCRIPT_JSON)?;
    transcript.validate()?;
    let options = SegmentationOptions::default().with_max_line_width(28).with_max_line_count(2);

    let cues: Vec<Cue> = segment_cues(&transcript, &options).collect();
    let path = temp_dir.path().join("show-subtitles.vtt");
    write_cues_to_vtt(&cues, &path)?;

    let content = std::fs::read_to_string(&path)?;
    assert_eq!(
        content,
        "WEBVTT\n\n\
         00:00:00.000 --> 00:00:02.100 align:middle\nWelcome to the show.\n\n\
         00:00:06.000 --> 00:00:08.000 align:middle\nToday we talk about rust.\n\n"
    );

    let reread = CaptionSet::from_file(&path)?;
    assert_eq!(reread.cues, cues);
    Ok(())
}

#[test]
fn test_subtitle_workflow_withNarrowLines_shouldWrapAndSplitCues() -> Result<()> {
    let transcript = TranscriptResult::from_json_str(TRANSCRIPT_JSON)?;
    let options = SegmentationOptions::default().with_max_line_width(10).with_max_line_count(2);

    let cues: Vec<Cue> = segment_cues(&transcript, &options).collect();

    assert_eq!(
        cues,
        vec![
            Cue::new(0.0, 2.1, "Welcome to\nthe show."),
            Cue::new(6.0, 7.4, "Today we\ntalk about"),
            Cue::new(7.4, 8.0, "rust."),
        ]
    );
    Ok(())
}

#[test]
fn test_subtitle_workflow_withHighlighting_shouldProduceWordCuesAndFillers() -> Result<()> {
    let transcript = TranscriptResult::from_json_str(
        r#"{"language":"en","segments":[{"start":0.0,"end":1.2,"words":[
            {"word":" Hi","start":0.0,"end":0.4},
            {"word":" you","start":0.6,"end":1.2}
        ]}]}"#,
    )?;
    let options = SegmentationOptions::default()
        .with_max_line_width(28)
        .with_max_line_count(2)
        .with_highlight_words(true);

    let document = vttwai::to_webvtt(segment_cues(&transcript, &options));

    assert_eq!(
        document,
        "WEBVTT\n\n\
         00:00:00.000 --> 00:00:00.400 align:middle\n<u>Hi</u> you\n\n\
         00:00:00.400 --> 00:00:00.600 align:middle\nHi you\n\n\
         00:00:00.600 --> 00:00:01.200 align:middle\nHi <u>you</u>\n\n"
    );
    Ok(())
}

#[test]
fn test_subtitle_workflow_withJsonBackend_shouldMatchDirectParsing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "show.json", TRANSCRIPT_JSON)?;

    let loaded = tokio_test::block_on(JsonTranscriptBackend.transcribe(&path))?;
    let parsed = TranscriptResult::from_json_str(TRANSCRIPT_JSON)?;

    assert_eq!(loaded.segments, parsed.segments);
    assert_eq!(loaded.full_text, " Welcome to the show. Today we talk about rust.");
    assert_eq!(loaded.language, "en");
    Ok(())
}
