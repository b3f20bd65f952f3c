//! End-to-end GPT-2-style encode/decode behavior over a small in-memory
//! fixture vocabulary.

use bytebpe::{MergeTable, Tokenizer, VocabStore};

fn gpt2_tokenizer() -> Tokenizer {
    let vocab = VocabStore::from_json_str(
        r#"{
            "<|endoftext|>": 0,
            "H": 1, "e": 2, "l": 3, "o": 4, "W": 5, "r": 6, "d": 7, "Ġ": 8,
            "He": 9, "ll": 10, "Hell": 11, "Hello": 12,
            "Wo": 13, "rl": 14, "Worl": 15, "World": 16, "ĠWorld": 17
        }"#,
    )
    .unwrap();
    let merges =
        MergeTable::from_str("#v\nH e\nl l\nHe ll\nHell o\nW o\nr l\nWo rl\nWorl d\nĠ World\n")
            .unwrap();
    Tokenizer::builder(vocab, merges)
        .unk_token("<|endoftext|>")
        .bos_token("<|endoftext|>")
        .eos_token("<|endoftext|>")
        .build()
        .unwrap()
}

#[test]
fn splits_leading_space_into_the_next_word() {
    let tok = gpt2_tokenizer();
    let tokens = tok.encode("Hello World", false).unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].value, "Hello");
    assert_eq!(tokens[1].value, "ĠWorld");
}

#[test]
fn offsets_cover_the_source_text() {
    let tok = gpt2_tokenizer();
    let tokens = tok.encode("Hello World", false).unwrap();
    assert_eq!(tokens[0].offset.index, 0);
    assert_eq!(tokens[0].offset.length, 5);
    assert_eq!(tokens[1].offset.index, 5);
    assert_eq!(tokens[1].offset.length, 6);
}

#[test]
fn decode_reconstructs_the_original_text() {
    let tok = gpt2_tokenizer();
    let ids = tok.encode_to_ids("Hello World", false).unwrap();
    assert_eq!(tok.decode(&ids, true), "Hello World");
}

#[test]
fn special_tokens_are_suppressed_by_default_in_decode() {
    let tok = gpt2_tokenizer();
    let ids = tok.encode_to_ids("Hello World", true).unwrap();
    assert_eq!(tok.decode(&ids, false), "Hello World");
}

#[test]
fn repeated_words_reuse_the_cache_consistently() {
    let tok = gpt2_tokenizer();
    let once = tok.encode_to_ids("Hello World", false).unwrap();
    let twice = tok.encode_to_ids("Hello World Hello World", false).unwrap();
    assert_eq!(twice, [once.clone(), once].concat());
}

#[test]
fn empty_input_yields_no_tokens() {
    let tok = gpt2_tokenizer();
    assert!(tok.encode_to_ids("", false).unwrap().is_empty());
}

#[test]
fn unknown_word_falls_back_to_unk_token() {
    let tok = gpt2_tokenizer();
    let ids = tok.encode_to_ids("xyz", false).unwrap();
    assert!(ids.iter().all(|&id| id == tok.unk_token().unwrap()));
}
