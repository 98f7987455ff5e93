//! Text processing utilities.
//!
//! Provides whitespace normalization, line-aware sentence splitting and
//! word tokenization for the repetition detector.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Runs of carriage returns ending in a newline.
///
/// `\r\r\n` becomes a single `\n`. Replacing only `\r\n` would leave a
/// stray `\r` at the end of the line; sentences are trimmed, so detection is
/// the same either way, but the normalized text would not be idempotent.
static LINE_ENDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r+\n").expect("valid regex"));

/// Runs of horizontal whitespace.
static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t ]+").expect("valid regex"));

/// A word: letters, decimal digits and apostrophes.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{Nd}']+").expect("valid regex"));

/// Text with canonical line endings and single spaces, trimmed at both ends.
///
/// Produced once by [`NormalizedText::new`] and never mutated afterwards.
/// Line numbers reported by the detector are 1-based lines of this text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizedText(String);

impl NormalizedText {
    /// Normalize raw text.
    ///
    /// Collapses `\r\n` to `\n`, squeezes every run of tabs and spaces into
    /// a single space, then trims. Case is preserved.
    pub fn new(raw: &str) -> Self {
        let unified = LINE_ENDING.replace_all(raw, "\n");
        let squeezed = HORIZONTAL_SPACE.replace_all(&unified, " ");
        Self(squeezed.trim().to_string())
    }

    /// Borrow the normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if there is no text at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(line_number, line)` pairs, numbered from 1.
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.split('\n').enumerate().map(|(i, line)| (i + 1, line))
    }

    /// Iterate over every sentence in the text, line by line.
    ///
    /// The iterator is lazy and borrows from `self`; call again to restart.
    pub fn sentences(&self) -> impl Iterator<Item = Sentence<'_>> {
        self.lines()
            .filter(|(_, line)| !line.trim().is_empty())
            .flat_map(|(line_number, line)| Sentences::new(line, line_number))
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A trimmed, non-empty sentence and the line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    /// The sentence text, trimmed.
    pub text: &'a str,
    /// 1-based line number in the normalized text.
    pub line: usize,
}

impl<'a> Sentence<'a> {
    /// Tokens of this sentence, in order of appearance.
    pub fn tokens(&self) -> Vec<&'a str> {
        tokenize(self.text)
    }
}

/// Lazy sentence splitter over a single line.
///
/// A boundary is the position right after one of `. ! ? ; :` when it is
/// followed by whitespace. The whitespace run is consumed and every piece
/// is trimmed; empty pieces are skipped. Abbreviations and decimals are not
/// special-cased.
#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    rest: &'a str,
    line: usize,
}

impl<'a> Sentences<'a> {
    /// Split `line`, tagging each sentence with `line_number`.
    pub const fn new(line: &'a str, line_number: usize) -> Self {
        Self {
            rest: line,
            line: line_number,
        }
    }
}

impl<'a> Iterator for Sentences<'a> {
    type Item = Sentence<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.rest.is_empty() {
            let (piece, rest) = split_at_boundary(self.rest);
            self.rest = rest;

            let text = piece.trim();
            if !text.is_empty() {
                return Some(Sentence {
                    text,
                    line: self.line,
                });
            }
        }
        None
    }
}

/// Split off the first sentence piece, returning `(piece, remainder)`.
fn split_at_boundary(s: &str) -> (&str, &str) {
    let mut prev: Option<char> = None;
    for (i, ch) in s.char_indices() {
        if ch.is_whitespace() && prev.is_some_and(is_sentence_terminator) {
            return (&s[..i], s[i..].trim_start());
        }
        prev = Some(ch);
    }
    (s, "")
}

const fn is_sentence_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | ';' | ':')
}

/// Split a line into trimmed sentences.
pub fn split_sentences(line: &str) -> Vec<&str> {
    Sentences::new(line, 1).map(|s| s.text).collect()
}

/// Extract word tokens: maximal runs of letters, digits and apostrophes.
pub fn tokenize(text: &str) -> Vec<&str> {
    TOKEN_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Number of word tokens in `text`.
pub fn count_words(text: &str) -> usize {
    TOKEN_PATTERN.find_iter(text).count()
}
