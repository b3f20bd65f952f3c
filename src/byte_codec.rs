//! Byte-visible codec: the GPT-2 `bytes_to_unicode()` bijection.
//!
//! Maps each of the 256 byte values to a printable Unicode code point so that
//! byte-level BPE can run over ordinary `char`/`str` machinery while still
//! covering every possible byte, including raw control bytes that are not
//! themselves valid UTF-8 on their own.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Get the byte-to-unicode mapping used by byte-level BPE.
pub fn bytes_to_unicode() -> &'static HashMap<u8, char> {
    static BYTE_ENCODER: OnceLock<HashMap<u8, char>> = OnceLock::new();
    BYTE_ENCODER.get_or_init(|| {
        let mut bs: Vec<u32> = Vec::new();
        bs.extend(u32::from(b'!')..=u32::from(b'~'));
        bs.extend(0xA1..=0xAC);
        bs.extend(0xAE..=0xFF);

        let mut cs = bs.clone();
        let mut n = 0;
        for b in 0u32..256u32 {
            if !bs.contains(&b) {
                bs.push(b);
                cs.push(256 + n);
                n += 1;
            }
        }

        bs.iter()
            .zip(cs.iter())
            .map(|(&byte_val, &unicode_val)| {
                (byte_val as u8, char::from_u32(unicode_val).unwrap())
            })
            .collect()
    })
}

/// The reverse mapping (visible char -> byte).
pub fn unicode_to_bytes() -> &'static HashMap<char, u8> {
    static BYTE_DECODER: OnceLock<HashMap<char, u8>> = OnceLock::new();
    BYTE_DECODER.get_or_init(|| bytes_to_unicode().iter().map(|(&k, &v)| (v, k)).collect())
}

fn char_strings() -> &'static HashMap<char, String> {
    static CHAR_STRINGS: OnceLock<HashMap<char, String>> = OnceLock::new();
    CHAR_STRINGS.get_or_init(|| {
        bytes_to_unicode()
            .values()
            .map(|&c| (c, c.to_string()))
            .collect()
    })
}

/// A single-character string for a visible-alphabet char, reusing a cached
/// allocation when `c` is one of the 256 codec characters.
pub fn char_to_string(c: char) -> Cow<'static, str> {
    match char_strings().get(&c) {
        Some(s) => Cow::Borrowed(s.as_str()),
        None => Cow::Owned(c.to_string()),
    }
}

/// Encode text bytes into the visible-char alphabet. One output `char` per
/// input byte, in order, so output `chars().nth(i)` always corresponds to
/// byte `i` of `text`.
#[must_use]
pub fn encode_bytes(text: &str) -> String {
    let byte_encoder = bytes_to_unicode();
    text.bytes()
        .map(|b| byte_encoder.get(&b).copied().unwrap_or('\u{fffd}'))
        .collect()
}

/// Encode text bytes to the visible-char alphabet along with a mapping from
/// each output char's index back to its absolute source offset
/// (`base_offset + byte index in text`). Since every encoded char accounts
/// for exactly one source byte, the mapping is the identity shifted by
/// `base_offset` - this function exists so the relationship in the header
/// doc-comment has a documented home rather than being re-derived ad hoc at
/// each call site.
#[must_use]
pub fn encode_with_offsets(text: &str, base_offset: usize) -> (String, Vec<usize>) {
    let encoded = encode_bytes(text);
    let offsets = (0..text.len()).map(|i| base_offset + i).collect();
    (encoded, offsets)
}

/// True if `c` is one of the 256 codec characters that stands in for a byte
/// which was not itself printable/safe (control bytes, whitespace, the
/// 0xAD soft hyphen, etc.), i.e. one of the chars assigned a code point at
/// or above 256 by `bytes_to_unicode`'s remapping loop, rather than one of
/// the bytes that map to themselves.
#[must_use]
pub fn is_remapped_control_byte(c: char) -> bool {
    (c as u32) >= 256 && unicode_to_bytes().contains_key(&c)
}

/// Decode visible-char text back to raw bytes, then to a `String`. Chars
/// outside the 256-entry alphabet are passed through as their own UTF-8
/// bytes rather than dropped, so decode never loses non-codec input.
#[must_use]
pub fn decode_bytes(text: &str) -> String {
    let byte_decoder = unicode_to_bytes();
    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        match byte_decoder.get(&c) {
            Some(&b) => bytes.push(b),
            None => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_maps_to_gpt2_sentinel() {
        let encoded = encode_bytes(" ");
        assert_eq!(encoded.chars().next().unwrap() as u32, 0x0120);
    }

    #[test]
    fn round_trips_ascii_and_utf8() {
        for text in ["Hello, World!", "naïve café", "日本語", ""] {
            assert_eq!(decode_bytes(&encode_bytes(text)), text);
        }
    }

    #[test]
    fn char_to_string_reuses_cached_allocation() {
        let a = char_to_string('!');
        let b = char_to_string('!');
        assert_eq!(a, b);
        assert!(matches!(a, Cow::Borrowed(_)));
    }

    #[test]
    fn encode_with_offsets_is_one_byte_per_char() {
        let (encoded, offsets) = encode_with_offsets("abc", 10);
        assert_eq!(encoded.chars().count(), 3);
        assert_eq!(offsets, vec![10, 11, 12]);
    }

    #[test]
    fn ascii_letters_are_not_remapped_control_bytes() {
        let encoded = encode_bytes("a");
        assert!(!is_remapped_control_byte(encoded.chars().next().unwrap()));
    }

    #[test]
    fn space_is_a_remapped_control_byte() {
        let encoded = encode_bytes(" ");
        assert!(is_remapped_control_byte(encoded.chars().next().unwrap()));
    }
}
