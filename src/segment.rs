//! Regex pre-segmentation that keeps merges inside lexical category boundaries.
//!
//! Text is split into chunks (contraction suffixes, letter runs, digit runs of at most three,
//! punctuation runs, whitespace runs). Training counts pairs per chunk and encoding encodes each
//! chunk independently, so no learned token ever spans two chunks.

use std::sync::OnceLock;

use fancy_regex::Regex;
use log::warn;

use crate::config::Segmentation;
use crate::error::Result;

/// GPT-2 split pattern.
pub const GPT2_SPLIT_PATTERN: &str =
    r"'(?:[sdmt]|ll|ve|re)| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

/// GPT-4 split pattern.
pub const GPT4_SPLIT_PATTERN: &str = r"'(?i:[sdmt]|ll|ve|re)|[^\r\n\p{L}\p{N}]?+\p{L}+|\p{N}{1,3}| ?[^\s\p{L}\p{N}]++[\r\n]*|\s*[\r\n]|\s+(?!\S)|\s+";

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("built-in split pattern compiles"))
        .clone()
}

/// Splits text into the chunks that bound every merge.
#[derive(Debug, Clone)]
pub struct Segmenter {
    pattern: String,
    regex: Regex,
}

impl Segmenter {
    /// Compiles a custom split pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Segmenter using [`GPT2_SPLIT_PATTERN`].
    #[must_use]
    pub fn gpt2() -> Self {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        Self {
            pattern: GPT2_SPLIT_PATTERN.to_string(),
            regex: compiled(&REGEX, GPT2_SPLIT_PATTERN),
        }
    }

    /// Segmenter using [`GPT4_SPLIT_PATTERN`].
    #[must_use]
    pub fn gpt4() -> Self {
        static REGEX: OnceLock<Regex> = OnceLock::new();
        Self {
            pattern: GPT4_SPLIT_PATTERN.to_string(),
            regex: compiled(&REGEX, GPT4_SPLIT_PATTERN),
        }
    }

    /// Returns the segmenter for a [`Segmentation`] mode, or `None` when disabled.
    #[must_use]
    pub fn for_mode(mode: Segmentation) -> Option<Self> {
        match mode {
            Segmentation::Disabled => None,
            Segmentation::Gpt2 => Some(Self::gpt2()),
            Segmentation::Gpt4 => Some(Self::gpt4()),
        }
    }

    /// The source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns every match of the pattern in order.
    ///
    /// The chunks always concatenate back to `text`: any span the pattern skips is emitted as
    /// its own chunk, and if the regex engine gives up (backtrack limit) the unmatched remainder
    /// becomes the final chunk.
    #[must_use]
    pub fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut chunks = Vec::new();
        let mut cursor = 0usize;
        for found in self.regex.find_iter(text) {
            match found {
                Ok(m) => {
                    if m.start() > cursor {
                        chunks.push(&text[cursor..m.start()]);
                    }
                    if m.end() > m.start() {
                        chunks.push(m.as_str());
                    }
                    cursor = cursor.max(m.end());
                }
                Err(err) => {
                    warn!("split pattern failed at byte {cursor}, keeping remainder whole: {err}");
                    break;
                }
            }
        }
        if cursor < text.len() {
            chunks.push(&text[cursor..]);
        }
        chunks
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::gpt4()
    }
}
