//! Text normalization as a tagged enum rather than a `dyn Trait`, so the
//! common no-op path costs nothing beyond a branch.

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalizer {
    /// No-op; the normalized text is the input text.
    Identity,
    /// ASCII-only lowercasing. Shape-preserving: it never changes UTF-8
    /// byte length for the bytes it touches, so offsets into the original
    /// text stay valid even though non-ASCII casing is left untouched.
    Lowercase,
}

impl Normalizer {
    /// Returns the normalized text and whether normalization reshaped it
    /// (changed its length/byte layout relative to the input). Both stock
    /// variants are shape-preserving; `reshaped` exists so a future
    /// shape-changing normalizer can signal that downstream offsets are
    /// relative to the normalized text, not the original.
    pub fn normalize<'a>(&self, text: &'a str) -> (Cow<'a, str>, bool) {
        match self {
            Normalizer::Identity => (Cow::Borrowed(text), false),
            Normalizer::Lowercase => {
                if text.bytes().all(|b| !b.is_ascii_uppercase()) {
                    (Cow::Borrowed(text), false)
                } else {
                    let lowered: String = text
                        .chars()
                        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
                        .collect();
                    (Cow::Owned(lowered), false)
                }
            }
        }
    }
}
