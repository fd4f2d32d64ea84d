/*!
 * Word highlighting.
 *
 * Expands one grouped cue into sub-cues, one per spoken word, with that word
 * underlined. Gaps between words are filled with the plain text so the line
 * stays on screen while nobody speaks.
 */

use regex::Regex;
use once_cell::sync::Lazy;

use crate::subtitle_processor::{seconds_to_millis, Cue};
use crate::transcript::Word;

// @const: Splits a word into leading whitespace, token and trailing whitespace
static WORD_PARTS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(\s*)(.*?)(\s*)$").unwrap()
});

/// Wrap the token of a word in `<u>` tags, leaving surrounding whitespace outside
pub fn underline(word: &str) -> String {
    WORD_PARTS_REGEX.replace(word, "${1}<u>${2}</u>${3}").into_owned()
}

/// Render one group of words as cues.
///
/// Without highlighting this is a single cue spanning the group. With
/// highlighting each word gets its own cue, preceded by a plain filler cue
/// whenever it does not start where the previous one ended. Times are
/// compared at millisecond precision, the resolution they are written with.
pub fn render_group(words: &[Word], highlight_words: bool) -> Vec<Cue> {
    let (Some(first), Some(last)) = (words.first(), words.last()) else {
        return Vec::new();
    };

    let plain_text: String = words.iter().map(|w| w.text.as_str()).collect();

    if !highlight_words {
        return vec![Cue::new(first.start, last.end, plain_text)];
    }

    let mut cues = Vec::with_capacity(words.len() * 2);
    let mut previous_end = first.start;

    for (i, word) in words.iter().enumerate() {
        if seconds_to_millis(previous_end) != seconds_to_millis(word.start) {
            cues.push(Cue::new(previous_end, word.start, plain_text.clone()));
        }

        let highlighted: String = words
            .iter()
            .enumerate()
            .map(|(j, w)| if j == i { underline(&w.text) } else { w.text.clone() })
            .collect();

        cues.push(Cue::new(word.start, word.end, highlighted));
        previous_end = word.end;
    }

    cues
}
