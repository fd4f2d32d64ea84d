/*!
 * Cue segmentation.
 *
 * Turns the word stream of a transcript into subtitle cues bounded by line
 * width, line count, long pauses and (optionally) segment boundaries.
 *
 * Segment preservation is active whenever either the line width or the line
 * count is left unset: cues then never span two segments, and neither the
 * pause rule nor the line-count rule applies.
 */

use std::collections::VecDeque;

use crate::highlight;
use crate::subtitle_processor::Cue;
use crate::transcript::{Segment, TranscriptResult, Word};

/// Gap between two words, in seconds, above which a new cue starts
pub const DEFAULT_PAUSE_THRESHOLD_SECS: f64 = 3.0;

/// Knobs controlling how words are grouped into lines and cues
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationOptions {
    /// Characters per line before forcing a line break; `None` means unbounded
    pub max_line_width: Option<usize>,

    /// Lines per cue before forcing a new cue
    pub max_line_count: Option<usize>,

    /// Emit one sub-cue per word with the spoken word underlined
    pub highlight_words: bool,

    /// Gap that forces a new cue when segment preservation is off
    pub pause_threshold_secs: f64,
}

impl Default for SegmentationOptions {
    fn default() -> Self {
        Self {
            max_line_width: None,
            max_line_count: None,
            highlight_words: false,
            pause_threshold_secs: DEFAULT_PAUSE_THRESHOLD_SECS,
        }
    }
}

impl SegmentationOptions {
    pub fn with_max_line_width(mut self, width: usize) -> Self {
        self.max_line_width = Some(width);
        self
    }

    pub fn with_max_line_count(mut self, count: usize) -> Self {
        self.max_line_count = Some(count);
        self
    }

    pub fn with_highlight_words(mut self, highlight_words: bool) -> Self {
        self.highlight_words = highlight_words;
        self
    }

    pub fn with_pause_threshold(mut self, seconds: f64) -> Self {
        self.pause_threshold_secs = seconds;
        self
    }

    /// Whether cues are kept within their source segment
    pub fn preserve_segments(&self) -> bool {
        self.max_line_width.is_none() || self.max_line_count.is_none()
    }
}

/// Lazy iterator over groups of words, one group per cue.
///
/// Each yielded word carries its display text: stripped at the start of a
/// line, prefixed with `\n` when it opens a new line inside the cue.
#[derive(Debug)]
pub struct WordGroups<'a> {
    segments: &'a [Segment],
    seg_idx: usize,
    word_idx: usize,
    max_line_width: usize,
    max_line_count: Option<usize>,
    preserve_segments: bool,
    pause_threshold_secs: f64,
    line_len: usize,
    line_count: usize,
    pending: Vec<Word>,
    previous_end: f64,
}

impl<'a> WordGroups<'a> {
    pub fn new(segments: &'a [Segment], options: &SegmentationOptions) -> Self {
        let previous_end = segments
            .first()
            .and_then(|s| s.words.first())
            .map(|w| w.start)
            .unwrap_or_default();

        Self {
            segments,
            seg_idx: 0,
            word_idx: 0,
            max_line_width: options.max_line_width.unwrap_or(usize::MAX),
            max_line_count: options.max_line_count,
            preserve_segments: options.preserve_segments(),
            pause_threshold_secs: options.pause_threshold_secs,
            line_len: 0,
            line_count: 1,
            pending: Vec::new(),
            previous_end,
        }
    }

    /// Next word of the flattened stream and whether it opens its segment
    fn next_word(&mut self) -> Option<(bool, &'a Word)> {
        while let Some(segment) = self.segments.get(self.seg_idx) {
            if let Some(word) = segment.words.get(self.word_idx) {
                let first_in_segment = self.word_idx == 0;
                self.word_idx += 1;
                return Some((first_in_segment, word));
            }
            self.seg_idx += 1;
            self.word_idx = 0;
        }
        None
    }

    /// Place one word, returning the finished group when the word opens a new cue
    fn push_word(&mut self, first_in_segment: bool, word: &Word) -> Option<Vec<Word>> {
        let mut timing = word.clone();
        let word_len = timing.text.chars().count();

        let long_pause = !self.preserve_segments && timing.start - self.previous_end > self.pause_threshold_secs;
        let has_room = self.line_len.saturating_add(word_len) <= self.max_line_width;
        let segment_break = first_in_segment && !self.pending.is_empty() && self.preserve_segments;

        let mut finished = None;
        if self.line_len > 0 && has_room && !long_pause && !segment_break {
            self.line_len += word_len;
        } else {
            timing.text = timing.text.trim().to_string();

            let line_limit_hit = self
                .max_line_count
                .is_some_and(|max| long_pause || self.line_count >= max);

            if (!self.pending.is_empty() && line_limit_hit) || segment_break {
                finished = Some(std::mem::take(&mut self.pending));
                self.line_count = 1;
            } else if self.line_len > 0 {
                self.line_count += 1;
                timing.text = format!("\n{}", timing.text);
            }
            self.line_len = timing.text.trim().chars().count();
        }

        self.previous_end = timing.end;
        self.pending.push(timing);
        finished
    }
}

impl Iterator for WordGroups<'_> {
    type Item = Vec<Word>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((first_in_segment, word)) = self.next_word() {
            if let Some(group) = self.push_word(first_in_segment, word) {
                return Some(group);
            }
        }

        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

/// Lazy iterator over the cues of a transcript
#[derive(Debug)]
pub struct Cues<'a> {
    inner: CuesInner<'a>,
}

#[derive(Debug)]
enum CuesInner<'a> {
    /// No word timings: one cue per segment
    Segments(std::slice::Iter<'a, Segment>),

    /// Word timings: grouped words, optionally expanded into highlight sub-cues
    Words {
        groups: WordGroups<'a>,
        highlight_words: bool,
        queued: VecDeque<Cue>,
    },
}

impl Iterator for Cues<'_> {
    type Item = Cue;

    fn next(&mut self) -> Option<Cue> {
        match &mut self.inner {
            CuesInner::Segments(segments) => segments.next().map(segment_cue),
            CuesInner::Words { groups, highlight_words, queued } => loop {
                if let Some(cue) = queued.pop_front() {
                    return Some(cue);
                }
                let group = groups.next()?;
                queued.extend(highlight::render_group(&group, *highlight_words));
            },
        }
    }
}

/// Cue for a segment without word timings
fn segment_cue(segment: &Segment) -> Cue {
    Cue::new(segment.start, segment.end, segment.text.trim().replace("-->", "->"))
}

/// Segment a transcript into cues.
///
/// Every call walks the transcript afresh. A transcript without segments
/// yields no cues.
pub fn segment_cues<'a>(result: &'a TranscriptResult, options: &SegmentationOptions) -> Cues<'a> {
    let inner = if result.has_word_timings() {
        CuesInner::Words {
            groups: WordGroups::new(&result.segments, options),
            highlight_words: options.highlight_words,
            queued: VecDeque::new(),
        }
    } else {
        CuesInner::Segments(result.segments.iter())
    };

    Cues { inner }
}
