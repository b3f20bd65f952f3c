//! Pre-tokenization as a tagged enum rather than a `dyn Trait`, avoiding a
//! virtual call per word in what is otherwise a tight loop.

use crate::Error;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreTokenizer {
    /// GPT-2 / CodeGen pre-tokenization grammar.
    Gpt2,
    /// RoBERTa uses the same byte-level BPE pre-tokenization grammar as
    /// GPT-2; kept as a distinct variant since a future RoBERTa-specific
    /// refinement would only need to change this arm.
    Roberta,
    /// Splits on runs of non-whitespace; useful for lightweight/test setups.
    Whitespace,
    /// Yields the entire input as a single span (used when pre-tokenization
    /// is disabled).
    WholeInput,
}

const GPT2_PATTERN: &str =
    r"'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";
const WHITESPACE_PATTERN: &str = r"\S+";

fn gpt2_regex() -> &'static fancy_regex::Regex {
    static REGEX: OnceLock<fancy_regex::Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        fancy_regex::Regex::new(GPT2_PATTERN).expect("GPT2_PATTERN is a fixed, valid pattern")
    })
}

fn whitespace_regex() -> &'static regex::Regex {
    static REGEX: OnceLock<regex::Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        regex::Regex::new(WHITESPACE_PATTERN).expect("WHITESPACE_PATTERN is a fixed, valid pattern")
    })
}

fn collect_fancy_spans(regex: &fancy_regex::Regex, text: &str) -> Result<Vec<(usize, usize)>, Error> {
    let mut spans = Vec::new();
    for m in regex.find_iter(text) {
        let m = m.map_err(|e| Error::InvalidArgument(format!("pre-tokenization failed: {e}")))?;
        spans.push((m.start(), m.end() - m.start()));
    }
    Ok(spans)
}

impl PreTokenizer {
    /// Split `text` into non-overlapping `(offset, length)` spans in
    /// ascending order. The union need not cover the whole input.
    pub fn split(&self, text: &str) -> Result<Vec<(usize, usize)>, Error> {
        match self {
            PreTokenizer::Gpt2 | PreTokenizer::Roberta => collect_fancy_spans(gpt2_regex(), text),
            PreTokenizer::Whitespace => Ok(whitespace_regex()
                .find_iter(text)
                .map(|m| (m.start(), m.end() - m.start()))
                .collect()),
            PreTokenizer::WholeInput => {
                if text.is_empty() {
                    Ok(Vec::new())
                } else {
                    Ok(vec![(0, text.len())])
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpt2_splits_on_leading_space_words() {
        let spans = PreTokenizer::Gpt2.split("Hello World").unwrap();
        let words: Vec<&str> = spans.iter().map(|&(s, l)| &"Hello World"[s..s + l]).collect();
        assert_eq!(words, vec!["Hello", " World"]);
    }

    #[test]
    fn whole_input_yields_one_span() {
        let spans = PreTokenizer::WholeInput.split("abc def").unwrap();
        assert_eq!(spans, vec![(0, 7)]);
    }

    #[test]
    fn whole_input_empty_text_yields_no_spans() {
        assert!(PreTokenizer::WholeInput.split("").unwrap().is_empty());
    }

    #[test]
    fn whitespace_splits_on_runs_of_non_whitespace() {
        let spans = PreTokenizer::Whitespace.split("foo  bar").unwrap();
        assert_eq!(spans, vec![(0, 3), (5, 3)]);
    }
}
