/*!
 * Timing model for speech transcripts.
 *
 * A transcript is an ordered list of segments, each optionally carrying
 * word-level timings. These are the values the segmenter consumes; they are
 * built once by a transcription backend and never mutated afterwards.
 */

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::SubtitleError;

/// A single transcribed word with its own timing, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Word text, usually with the leading space the recognizer emitted
    #[serde(alias = "word")]
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// A contiguous chunk of speech
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    /// Word timings, empty when the recognizer only produced segment timings
    #[serde(default)]
    pub words: Vec<Word>,
    pub start: f64,
    pub end: f64,
    /// Segment-level text, used when no word timings exist
    #[serde(default)]
    pub text: String,
}

impl Segment {
    /// Build a segment from its words; bounds and text are derived from them
    pub fn from_words(words: Vec<Word>) -> Self {
        let start = words.first().map(|w| w.start).unwrap_or_default();
        let end = words.last().map(|w| w.end).unwrap_or_default();
        let text = words.iter().map(|w| w.text.as_str()).collect();
        Self { words, start, end, text }
    }

    /// Build a segment without word timings
    pub fn without_words(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            words: Vec::new(),
            start,
            end,
            text: text.into(),
        }
    }
}

/// Result of one transcription request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub segments: Vec<Segment>,
    /// Concatenated transcript text
    #[serde(default, alias = "text")]
    pub full_text: String,
    /// ISO 639-1 code of the detected spoken language
    #[serde(default)]
    pub language: String,
}

impl TranscriptResult {
    /// Create a transcript; the full text is the concatenation of segment texts
    pub fn new(segments: Vec<Segment>, language: impl Into<String>) -> Self {
        let full_text = segments.iter().map(|s| s.text.as_str()).collect();
        Self {
            segments,
            full_text,
            language: language.into(),
        }
    }

    /// Whether word-level timings are available.
    ///
    /// Only the first segment is inspected: recognizers either produce word
    /// timings for every segment or for none.
    pub fn has_word_timings(&self) -> bool {
        self.segments.first().is_some_and(|s| !s.words.is_empty())
    }

    /// Load a transcript from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, SubtitleError> {
        serde_json::from_str(json).map_err(|e| SubtitleError::Parse(format!("invalid transcript JSON: {}", e)))
    }

    /// Load a transcript from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubtitleError::Parse(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    /// Check the ordering assumptions the segmenter relies on.
    ///
    /// Rejects transcripts without segments, words or segments whose end
    /// precedes their start, and word starts that move backwards in time.
    pub fn validate(&self) -> Result<(), SubtitleError> {
        if self.segments.is_empty() {
            return Err(SubtitleError::MalformedInput("transcript has no segments".to_string()));
        }

        let mut previous_start = f64::NEG_INFINITY;
        for (seg_idx, segment) in self.segments.iter().enumerate() {
            if segment.end < segment.start {
                return Err(SubtitleError::MalformedInput(format!(
                    "segment {} ends at {:.3}s before it starts at {:.3}s",
                    seg_idx, segment.end, segment.start
                )));
            }

            for word in &segment.words {
                if word.end < word.start {
                    return Err(SubtitleError::MalformedInput(format!(
                        "word '{}' in segment {} ends at {:.3}s before it starts at {:.3}s",
                        word.text.trim(), seg_idx, word.end, word.start
                    )));
                }
                if word.start < previous_start {
                    return Err(SubtitleError::MalformedInput(format!(
                        "word '{}' in segment {} starts at {:.3}s, before the previous word at {:.3}s",
                        word.text.trim(), seg_idx, word.start, previous_start
                    )));
                }
                previous_start = word.start;
            }
        }

        Ok(())
    }
}
