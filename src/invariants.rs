//! Debug-mode runtime invariant assertions. Zero-cost in release builds.

use crate::Token;

/// All token ids in the slice are within vocabulary bounds.
#[inline]
pub fn assert_tokens_in_bounds(tokens: &[Token], vocab_size: usize) {
    #[cfg(debug_assertions)]
    {
        for (i, t) in tokens.iter().enumerate() {
            debug_assert!(
                (t.id as usize) < vocab_size,
                "invariant violation: token[{i}] id {} >= vocab_size ({vocab_size})",
                t.id
            );
        }
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = (tokens, vocab_size);
    }
}

/// Offsets are non-decreasing and, for non-special tokens, within bounds.
#[inline]
pub fn assert_offsets_monotonic(tokens: &[Token], text_len: usize) {
    #[cfg(debug_assertions)]
    {
        let mut last = 0usize;
        for (i, t) in tokens.iter().enumerate() {
            debug_assert!(
                t.offset.index >= last,
                "invariant violation: token[{i}] offset {} precedes prior offset {last}",
                t.offset.index
            );
            if t.offset.length > 0 {
                debug_assert!(
                    t.offset.index + t.offset.length <= text_len,
                    "invariant violation: token[{i}] offset ({}, {}) exceeds text length {text_len}",
                    t.offset.index,
                    t.offset.length
                );
            }
            last = t.offset.index;
        }
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = (tokens, text_len);
    }
}

/// Combined postconditions checked after `Tokenizer::encode_with`.
#[inline]
pub fn assert_encode_postconditions(tokens: &[Token], vocab_size: usize, text_len: usize) {
    #[cfg(debug_assertions)]
    {
        assert_tokens_in_bounds(tokens, vocab_size);
        assert_offsets_monotonic(tokens, text_len);
        debug_assert!(
            tokens.len() <= crate::MAX_OUTPUT_TOKENS,
            "invariant violation: token count {} exceeds MAX_OUTPUT_TOKENS ({})",
            tokens.len(),
            crate::MAX_OUTPUT_TOKENS
        );
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = (tokens, vocab_size, text_len);
    }
}
