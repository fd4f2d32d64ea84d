/*!
 * Tests for WebVTT serialization and parsing
 */

use anyhow::Result;
use vttwai::errors::SubtitleError;
use vttwai::subtitle_processor::{
    CaptionSet, Cue, MAX_TEXTS_PER_CHUNK, chunk_ranges, format_timestamp, parse_timestamp, to_webvtt,
    write_cues_to_vtt,
};
use crate::common;

#[test]
fn test_to_webvtt_withSingleCue_shouldMatchExactLayout() {
    let output = to_webvtt(&[Cue::new(1.5, 3.25, "Hi there")]);

    assert_eq!(output, "WEBVTT\n\n00:00:01.500 --> 00:00:03.250 align:middle\nHi there\n\n");
}

#[test]
fn test_to_webvtt_withNoCues_shouldEmitHeaderOnly() {
    let cues: Vec<Cue> = Vec::new();

    assert_eq!(to_webvtt(&cues), "WEBVTT\n\n");
}

#[test]
fn test_to_webvtt_withMultilineCue_shouldKeepLineBreaks() {
    let output = to_webvtt(vec![Cue::new(0.0, 1.0, "one\ntwo"), Cue::new(3600.0, 3601.001, "three")]);

    assert_eq!(
        output,
        "WEBVTT\n\n\
         00:00:00.000 --> 00:00:01.000 align:middle\none\ntwo\n\n\
         01:00:00.000 --> 01:00:01.001 align:middle\nthree\n\n"
    );
}

#[test]
fn test_format_timestamp_withLargeHours_shouldNotWrap() {
    assert_eq!(format_timestamp(100.0 * 3600.0), "100:00:00.000");
    assert_eq!(format_timestamp(-1.0), "00:00:00.000");
}

#[test]
fn test_parse_timestamp_withBothForms_shouldReturnSeconds() -> Result<()> {
    assert_eq!(parse_timestamp("01:02:03.456")?, 3723.456);
    assert_eq!(parse_timestamp("02:03.456")?, 123.456);
    assert!(parse_timestamp("02:03,456").is_err());
    assert!(parse_timestamp("00:61:00.000").is_err());
    Ok(())
}

#[test]
fn test_caption_set_from_file_withStylesAndNotes_shouldKeepStylesAndCues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_vtt(temp_dir.path(), "sample.vtt")?;

    let captions = CaptionSet::from_file(&path)?;

    assert_eq!(captions.source_path, path);
    assert_eq!(captions.styles, vec!["STYLE\n::cue {\n  color: yellow;\n}".to_string()]);
    assert_eq!(
        captions.cues,
        vec![
            Cue::new(1.0, 4.0, "This is a test subtitle."),
            Cue::new(5.0, 9.0, "It contains\nmultiple lines."),
            Cue::new(10.0, 14.0, "For testing purposes."),
        ]
    );
    Ok(())
}

#[test]
fn test_caption_set_write_withStyles_shouldPlaceStylesAfterHeader() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let captions = CaptionSet::new(temp_dir.path().join("styled.vtt"), vec![Cue::new(0.0, 1.0, "Hi")])
        .with_styles(vec!["STYLE\n::cue { color: red; }".to_string()]);

    captions.save()?;

    let content = std::fs::read_to_string(temp_dir.path().join("styled.vtt"))?;
    assert_eq!(
        content,
        "WEBVTT\n\nSTYLE\n::cue { color: red; }\n\n00:00:00.000 --> 00:00:01.000 align:middle\nHi\n\n"
    );

    let reread = CaptionSet::from_file(temp_dir.path().join("styled.vtt"))?;
    assert_eq!(reread, captions);
    Ok(())
}

#[test]
fn test_parse_vtt_string_withMissingHeader_shouldFail() {
    let result = CaptionSet::parse_vtt_string("00:00:00.000 --> 00:00:01.000\nHi\n");

    assert!(matches!(result, Err(SubtitleError::Parse(_))));
}

#[test]
fn test_parse_vtt_string_withCrlfAndBom_shouldParse() -> Result<()> {
    let (cues, styles) = CaptionSet::parse_vtt_string("\u{feff}WEBVTT\r\n\r\n00:01.000 --> 00:02.500\r\nHi\r\n")?;

    assert!(styles.is_empty());
    assert_eq!(cues, vec![Cue::new(1.0, 2.5, "Hi")]);
    Ok(())
}

#[test]
fn test_with_translated_texts_withMatchingCount_shouldKeepTimingsAndSource() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::sample_caption_set(temp_dir.path());
    let texts = vec!["Hallo".to_string(), "General\nKenobi".to_string(), "Kühn".to_string()];

    let translated = source.with_translated_texts(texts, temp_dir.path().join("talk_de.vtt"))?;

    assert_eq!(translated.cues.len(), source.cues.len());
    for (translated_cue, source_cue) in translated.cues.iter().zip(&source.cues) {
        assert_eq!(translated_cue.start, source_cue.start);
        assert_eq!(translated_cue.end, source_cue.end);
    }
    assert_eq!(translated.cues[0].text, "Hallo");
    assert_eq!(source.cues[0].text, "Hello there");
    assert_eq!(translated.source_path, temp_dir.path().join("talk_de.vtt"));
    Ok(())
}

#[test]
fn test_with_translated_texts_withWrongCount_shouldFail() {
    let source = common::sample_caption_set(std::path::Path::new("/tmp"));

    let result = source.with_translated_texts(vec!["only one".to_string()], "/tmp/x.vtt");

    assert!(matches!(result, Err(SubtitleError::MalformedInput(_))));
}

#[test]
fn test_write_cues_to_vtt_withUnwritablePath_shouldReturnSerializationError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let blocker = common::create_test_file(temp_dir.path(), "not_a_dir", "")?;

    let result = write_cues_to_vtt(&[Cue::new(0.0, 1.0, "Hi")], blocker.join("out.vtt"));

    assert!(matches!(result, Err(SubtitleError::Serialization { .. })));
    Ok(())
}

#[test]
fn test_chunk_ranges_withCharacterBudget_shouldCoverAllItemsInOrder() {
    let chunks = chunk_ranges([4, 4, 4, 10, 1], 8);

    assert_eq!(chunks, vec![0..2, 2..3, 3..4, 4..5]);
}

#[test]
fn test_chunk_ranges_withManySmallItems_shouldCapItemsPerChunk() {
    let chunks = chunk_ranges(std::iter::repeat_n(1, MAX_TEXTS_PER_CHUNK + 5), 10_000);

    assert_eq!(chunks, vec![0..MAX_TEXTS_PER_CHUNK, MAX_TEXTS_PER_CHUNK..MAX_TEXTS_PER_CHUNK + 5]);
}

#[test]
fn test_chunk_ranges_withNoItems_shouldReturnNothing() {
    assert!(chunk_ranges(std::iter::empty(), 100).is_empty());
}
