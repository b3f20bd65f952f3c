//! Id sequence -> text. Total: well-formed ids always produce a string,
//! never an error, even for sparse or out-of-range ids.

use crate::byte_codec;
use crate::engine::Tokenizer;
use crate::TokenId;

pub fn decode(
    tokenizer: &Tokenizer,
    ids: &[TokenId],
    consider_special_tokens: bool,
    has_prefix_space: bool,
) -> String {
    let mut bytes: Vec<u8> = Vec::new();

    for &id in ids {
        if tokenizer.is_special_token(id) {
            if consider_special_tokens {
                if let Some(text) = tokenizer.map_id_to_token(id) {
                    bytes.extend_from_slice(text.as_bytes());
                }
            }
            continue;
        }

        if let Some(piece) = tokenizer.added_token_text(id) {
            bytes.extend_from_slice(piece.as_bytes());
            continue;
        }

        if let Some(piece) = tokenizer.vocab_token_text(id) {
            let unicode_to_bytes = byte_codec::unicode_to_bytes();
            for ch in piece.chars() {
                match unicode_to_bytes.get(&ch) {
                    Some(&b) => bytes.push(b),
                    None => {
                        let mut buf = [0u8; 4];
                        bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                    }
                }
            }
        }
        // ids with no vocabulary entry at all contribute nothing; decode
        // never fails on content.
    }

    let text = String::from_utf8_lossy(&bytes).into_owned();
    if has_prefix_space {
        text.strip_prefix(' ').map(str::to_string).unwrap_or(text)
    } else {
        text
    }
}
