//! Property-based tests for tokenizer invariants (see SPEC §8).
//!
//! Uses proptest to verify properties hold across a wide range of inputs,
//! against an in-memory fixture tokenizer covering the full byte-visible
//! alphabet so any arbitrary `&str` is encodable.

use bytebpe::{MergeTable, Tokenizer, VocabStore};
use proptest::prelude::*;

fn fixture_tokenizer() -> Tokenizer {
    let mut entries = Vec::new();
    for (i, ch) in bytebpe::byte_codec::bytes_to_unicode().values().enumerate() {
        entries.push(format!("{:?}: {}", ch.to_string(), i));
    }
    let base_len = entries.len();
    entries.push(format!("{:?}: {}", "<unk>", base_len));
    let vocab_json = format!("{{{}}}", entries.join(","));
    let vocab = VocabStore::from_json_str(&vocab_json).expect("fixture vocab must parse");
    let merges = MergeTable::from_str("#version\n").unwrap();
    Tokenizer::builder(vocab, merges)
        .unk_token("<unk>")
        .bos_token("<unk>")
        .eos_token("<unk>")
        .build()
        .expect("fixture tokenizer must build")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property 2 (§8): `len(encode(text)) == count_tokens(text)` exactly.
    #[test]
    fn prop_count_matches_encode_len(text in "\\PC{0,200}") {
        let tok = fixture_tokenizer();
        let tokens = tok.encode(&text, false).unwrap();
        let count = tok.count_tokens(&text, false).unwrap();
        prop_assert_eq!(tokens.len(), count);
    }

    /// Property 5 (§8): offsets are monotonic non-decreasing and in bounds.
    #[test]
    fn prop_offsets_are_monotonic_and_in_bounds(text in "\\PC{0,200}") {
        let tok = fixture_tokenizer();
        let tokens = tok.encode(&text, false).unwrap();
        let mut last = 0usize;
        for t in &tokens {
            prop_assert!(t.offset.index >= last);
            prop_assert!(t.offset.index + t.offset.length <= text.len());
            last = t.offset.index;
        }
    }

    /// Property 3 (§8): a bounded encode is always a prefix of the full one.
    #[test]
    fn prop_bounded_encode_is_a_prefix(text in "[a-zA-Z ]{1,200}", max in 1usize..50) {
        let tok = fixture_tokenizer();
        let full = tok.encode_to_ids(&text, false).unwrap();
        let (bounded, _) = tok.encode_to_ids_bounded(&text, max, false).unwrap();
        prop_assert_eq!(&bounded[..], &full[..bounded.len()]);
    }

    /// Property 4 (§8): `index_of_token_count` covers the whole text iff the
    /// full count is within budget.
    #[test]
    fn prop_index_of_token_count_covers_whole_text_iff_within_budget(
        text in "[a-zA-Z ]{1,200}", max in 1usize..50
    ) {
        let tok = fixture_tokenizer();
        let total = tok.count_tokens(&text, false).unwrap();
        let (text_len, _) = tok.index_of_token_count(&text, max, false).unwrap();
        prop_assert_eq!(text_len == text.len(), total <= max);
    }

    /// Property 7 (§8): encoding the same text twice is coherent regardless
    /// of cache state.
    #[test]
    fn prop_encoding_is_deterministic(text in "\\PC{0,200}") {
        let tok = fixture_tokenizer();
        let a = tok.encode_to_ids(&text, false).unwrap();
        let b = tok.encode_to_ids(&text, false).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Property 6 (§8): adding BOS/EOS changes token count by exactly the
    /// number of flags set to true (here both are set by one flag).
    #[test]
    fn prop_special_tokens_add_exactly_two(text in "[a-zA-Z ]{1,200}") {
        let tok = fixture_tokenizer();
        let without = tok.encode(&text, false).unwrap().len();
        let with = tok.encode(&text, true).unwrap().len();
        prop_assert_eq!(with, without + 2);
    }

    /// Truncation correctness (§4.7, §8): the `text_length`/`text_index` a
    /// bounded query reports is always a `char` boundary, i.e. it never
    /// lands in the middle of a multi-byte code point. Offsets here are
    /// UTF-8 byte offsets, so this is the real form of the "never split a
    /// multi-byte code point" rule; `offset.index` equality between
    /// adjacent tokens does not hold under byte offsets and would pass
    /// vacuously.
    #[test]
    fn prop_truncation_lands_on_a_char_boundary(text in "\\PC{0,200}", max in 1usize..50) {
        let tok = fixture_tokenizer();
        let (_, text_length) = tok.encode_to_ids_bounded(&text, max, false).unwrap();
        prop_assert!(text.is_char_boundary(text_length));

        let (text_index, _) = tok.index_of_token_count(&text, max, false).unwrap();
        prop_assert!(text.is_char_boundary(text_index));

        let (suffix_index, _) = tok.last_index_of_token_count(&text, max, false).unwrap();
        prop_assert!(text.is_char_boundary(suffix_index));
    }
}
