use std::borrow::Borrow;
use std::fmt;
use std::fs;
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use tempfile::NamedTempFile;
use log::{debug, warn};

use crate::errors::SubtitleError;

// @module: WebVTT caption model, serialization and parsing

/// First line of every WebVTT file
pub const WEBVTT_HEADER: &str = "WEBVTT";

/// Positioning directive appended to every cue timing line
pub const CUE_SETTINGS: &str = "align:middle";

/// Maximum number of texts sent to the translation backend in one request
pub const MAX_TEXTS_PER_CHUNK: usize = 50;

// @const: WebVTT timing line regex, hours optional
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:\d+:)?\d{2}:\d{2}\.\d{3})\s+-->\s+((?:\d+:)?\d{2}:\d{2}\.\d{3})(?:\s+.*)?$").unwrap()
});

/// Round a time in seconds to whole milliseconds; negative times clamp to zero
pub fn seconds_to_millis(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}

/// Format a time in seconds as `HH:MM:SS.mmm`, hours always included
pub fn format_timestamp(seconds: f64) -> String {
    let ms = seconds_to_millis(seconds);
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let secs = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

/// Parse a WebVTT timestamp (`HH:MM:SS.mmm` or `MM:SS.mmm`) into seconds
pub fn parse_timestamp(timestamp: &str) -> Result<f64, SubtitleError> {
    let invalid = || SubtitleError::Parse(format!("Invalid timestamp format: {}", timestamp));

    let (clock, millis) = timestamp.trim().split_once('.').ok_or_else(invalid)?;
    if millis.len() != 3 {
        return Err(invalid());
    }
    let millis: u64 = millis.parse().map_err(|_| invalid())?;

    let parts = clock
        .split(':')
        .map(|p| p.parse::<u64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => (0, *m, *s),
        _ => return Err(invalid()),
    };

    if minutes >= 60 || seconds >= 60 {
        return Err(SubtitleError::Parse(format!("Invalid time components in timestamp: {}", timestamp)));
    }

    let total_ms = hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis;
    Ok(total_ms as f64 / 1000.0)
}

/// One timed subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,

    /// Display text, lines separated by `\n`
    pub text: String,
}

impl Cue {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Copy of this cue with replacement text and the same timing
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            start: self.start,
            end: self.end,
            text: text.into(),
        }
    }

    pub fn format_start_time(&self) -> String {
        format_timestamp(self.start)
    }

    pub fn format_end_time(&self) -> String {
        format_timestamp(self.end)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} --> {} {}", self.format_start_time(), self.format_end_time(), CUE_SETTINGS)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Render cues as a complete WebVTT document
pub fn to_webvtt<I>(cues: I) -> String
where
    I: IntoIterator,
    I::Item: Borrow<Cue>,
{
    render_webvtt(cues, &[])
}

/// Render cues as a WebVTT document with STYLE blocks placed after the header
pub fn render_webvtt<I>(cues: I, styles: &[String]) -> String
where
    I: IntoIterator,
    I::Item: Borrow<Cue>,
{
    let mut output = format!("{}\n\n", WEBVTT_HEADER);
    for style in styles {
        output.push_str(style.trim_end());
        output.push_str("\n\n");
    }
    for cue in cues {
        output.push_str(&cue.borrow().to_string());
    }
    output
}

/// Write a WebVTT document to disk, creating parent directories as needed.
///
/// The document goes to a temporary file next to `path` and is renamed into
/// place, so a failed write leaves nothing behind.
fn write_document(path: &Path, document: &str) -> Result<(), SubtitleError> {
    let serialization_error = |e: std::io::Error| SubtitleError::Serialization {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(serialization_error)?;

    let mut file = NamedTempFile::new_in(parent).map_err(serialization_error)?;
    file.write_all(document.as_bytes()).map_err(serialization_error)?;
    file.flush().map_err(serialization_error)?;

    // NamedTempFile is created 0600
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(serialization_error)?;
    }

    file.persist(path).map_err(|e| serialization_error(e.error))?;
    Ok(())
}

/// Write cues straight to a WebVTT file
pub fn write_cues_to_vtt<I, P>(cues: I, path: P) -> Result<(), SubtitleError>
where
    I: IntoIterator,
    I::Item: Borrow<Cue>,
    P: AsRef<Path>,
{
    write_document(path.as_ref(), &to_webvtt(cues))
}

/// One caption track in one language, tied to one source file
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionSet {
    /// Path of the caption file this set was read from or will be written to
    pub source_path: PathBuf,

    /// Cues in chronological order
    pub cues: Vec<Cue>,

    /// STYLE blocks, kept verbatim
    pub styles: Vec<String>,
}

impl CaptionSet {
    /// Create a caption set without styles
    pub fn new(source_path: impl Into<PathBuf>, cues: Vec<Cue>) -> Self {
        Self {
            source_path: source_path.into(),
            cues,
            styles: Vec::new(),
        }
    }

    /// Attach STYLE blocks
    pub fn with_styles(mut self, styles: Vec<String>) -> Self {
        self.styles = styles;
        self
    }

    /// Read a WebVTT file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| SubtitleError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;
        let (cues, styles) = Self::parse_vtt_string(&content)?;

        debug!("Read {} cues and {} style blocks from {}", cues.len(), styles.len(), path.display());

        Ok(Self {
            source_path: path.to_path_buf(),
            cues,
            styles,
        })
    }

    /// Parse WebVTT content into cues and STYLE blocks.
    ///
    /// NOTE and REGION blocks are skipped, as are cue settings on timing lines.
    pub fn parse_vtt_string(content: &str) -> Result<(Vec<Cue>, Vec<String>), SubtitleError> {
        let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
        let mut blocks = split_blocks(&content).into_iter();

        let header = blocks
            .next()
            .ok_or_else(|| SubtitleError::Parse("empty WebVTT document".to_string()))?;
        if !header[0].starts_with(WEBVTT_HEADER) {
            return Err(SubtitleError::Parse(format!("missing WEBVTT header, found '{}'", header[0])));
        }

        let mut cues = Vec::new();
        let mut styles = Vec::new();

        for block in blocks {
            let first = block[0];
            if first.starts_with("STYLE") {
                styles.push(block.join("\n"));
                continue;
            }
            if first.starts_with("NOTE") || first.starts_with("REGION") {
                continue;
            }

            let Some(timing_idx) = block.iter().position(|line| line.contains("-->")) else {
                warn!("Skipping WebVTT block without timing line: '{}'", first);
                continue;
            };

            let timing_line = block[timing_idx].trim();
            let caps = TIMING_REGEX
                .captures(timing_line)
                .ok_or_else(|| SubtitleError::Parse(format!("invalid cue timing line: '{}'", timing_line)))?;

            let start = parse_timestamp(&caps[1])?;
            let end = parse_timestamp(&caps[2])?;
            let text = block[timing_idx + 1..].join("\n");

            cues.push(Cue::new(start, end, text));
        }

        Ok((cues, styles))
    }

    /// Render this set as WebVTT
    pub fn to_webvtt(&self) -> String {
        render_webvtt(&self.cues, &self.styles)
    }

    /// Write this set to the given path
    pub fn write_to_vtt<P: AsRef<Path>>(&self, path: P) -> Result<(), SubtitleError> {
        write_document(path.as_ref(), &self.to_webvtt())
    }

    /// Write this set to its own source path
    pub fn save(&self) -> Result<(), SubtitleError> {
        self.write_to_vtt(&self.source_path)
    }

    /// Cue texts in order
    pub fn texts(&self) -> Vec<String> {
        self.cues.iter().map(|c| c.text.clone()).collect()
    }

    /// Build a new set with the same timings and styles but replacement texts.
    ///
    /// The source set is left untouched so it can be shared between jobs.
    pub fn with_translated_texts(&self, texts: Vec<String>, source_path: impl Into<PathBuf>) -> Result<Self, SubtitleError> {
        if texts.len() != self.cues.len() {
            return Err(SubtitleError::MalformedInput(format!(
                "{} translated texts for {} cues",
                texts.len(),
                self.cues.len()
            )));
        }

        let cues = self
            .cues
            .iter()
            .zip(texts)
            .map(|(cue, text)| cue.with_text(text))
            .collect();

        Ok(Self {
            source_path: source_path.into(),
            cues,
            styles: self.styles.clone(),
        })
    }
}

/// Group consecutive items of the given sizes into index ranges.
///
/// A range sums to at most `max_chars_per_chunk` and spans at most
/// [`MAX_TEXTS_PER_CHUNK`] items; an item larger than the budget gets a range
/// of its own. Ranges are contiguous and cover every item in order.
pub fn chunk_ranges<I>(sizes: I, max_chars_per_chunk: usize) -> Vec<Range<usize>>
where
    I: IntoIterator<Item = usize>,
{
    let max_chars = max_chars_per_chunk.max(1);
    let mut chunks = Vec::new();
    let mut chunk_start = 0;
    let mut current_size = 0;
    let mut count = 0;

    for (idx, size) in sizes.into_iter().enumerate() {
        let current_entries = idx - chunk_start;

        if current_entries > 0 && (current_size + size > max_chars || current_entries >= MAX_TEXTS_PER_CHUNK) {
            chunks.push(chunk_start..idx);
            chunk_start = idx;
            current_size = 0;
        }

        current_size += size;
        count = idx + 1;
    }

    if count > chunk_start {
        chunks.push(chunk_start..count);
    }

    chunks
}

/// Group non-blank lines into blocks separated by blank lines
fn split_blocks(content: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}
