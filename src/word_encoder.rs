//! The BPE merge loop: turns one pre-tokenized word into an ordered list of
//! sub-tokens.
//!
//! Structurally this is the linked-list-of-symbols-plus-min-heap merge loop
//! from the project's original GPT-2 BPE session, generalized in one way:
//! each symbol's position is tracked in units of visible-alphabet chars
//! rather than raw bytes of a single fragment, and that position maps back
//! to the word's absolute source offset via a strict 1-byte-to-1-char
//! relationship (`byte_codec::encode_bytes` never merges or splits bytes),
//! so no separate index-map needs to be threaded through the merge loop.

use crate::merges::MergeTable;
use crate::vocab::VocabStore;
use crate::{byte_codec, Offset, Token, TokenId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct Symbol {
    /// Index into `chars` where this symbol's piece starts.
    piece_start: usize,
    /// Number of chars in this piece; 0 means the symbol was merged away.
    piece_len: usize,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct Candidate {
    left: usize,
    right: usize,
    rank: usize,
    total_len: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; lower rank must win, and among equal
        // ranks the leftmost (smaller `left`) must win.
        other
            .rank
            .cmp(&self.rank)
            .then_with(|| other.left.cmp(&self.left))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn piece_text(chars: &[char], symbols: &[Symbol], idx: usize) -> String {
    chars[symbols[idx].piece_start..symbols[idx].piece_start + symbols[idx].piece_len]
        .iter()
        .collect()
}

fn try_add_candidate(
    heap: &mut BinaryHeap<Candidate>,
    chars: &[char],
    symbols: &[Symbol],
    merges: &MergeTable,
    left: usize,
    right: usize,
) {
    if symbols[left].piece_len == 0 || symbols[right].piece_len == 0 {
        return;
    }
    let left_text = piece_text(chars, symbols, left);
    let right_text = piece_text(chars, symbols, right);
    if let Some(rank) = merges.rank(&left_text, &right_text) {
        heap.push(Candidate {
            left,
            right,
            rank,
            total_len: symbols[left].piece_len + symbols[right].piece_len,
        });
    }
}

/// Encode one pre-tokenized word. `word_start` is the word's absolute byte
/// offset in the text the caller is encoding; returned token offsets are
/// absolute. `unk_id`, if set, is emitted for visible-alphabet pieces with
/// no vocabulary entry; otherwise such pieces are silently dropped.
pub fn encode_word(
    word: &str,
    word_start: usize,
    vocab: &VocabStore,
    merges: &MergeTable,
    unk_id: Option<TokenId>,
) -> Vec<Token> {
    if word.is_empty() {
        return Vec::new();
    }

    let visible = byte_codec::encode_bytes(word);
    let chars: Vec<char> = visible.chars().collect();
    let n = chars.len();

    let mut symbols: Vec<Symbol> = (0..n)
        .map(|i| Symbol {
            piece_start: i,
            piece_len: 1,
            prev: if i == 0 { None } else { Some(i - 1) },
            next: if i + 1 < n { Some(i + 1) } else { None },
        })
        .collect();

    let mut heap: BinaryHeap<Candidate> = BinaryHeap::new();
    for i in 0..n.saturating_sub(1) {
        try_add_candidate(&mut heap, &chars, &symbols, merges, i, i + 1);
    }

    while let Some(candidate) = heap.pop() {
        let (left, right) = (candidate.left, candidate.right);

        if symbols[left].piece_len == 0 || symbols[right].piece_len == 0 {
            continue; // one side already merged away
        }
        if symbols[left].next != Some(right) {
            continue; // no longer adjacent
        }
        if symbols[left].piece_len + symbols[right].piece_len != candidate.total_len {
            continue; // stale: pieces changed since this candidate was queued
        }

        symbols[left].piece_len += symbols[right].piece_len;
        symbols[right].piece_len = 0;
        symbols[left].next = symbols[right].next;
        if let Some(next) = symbols[right].next {
            symbols[next].prev = Some(left);
        }

        if let Some(prev) = symbols[left].prev {
            try_add_candidate(&mut heap, &chars, &symbols, merges, prev, left);
        }
        if let Some(next) = symbols[left].next {
            try_add_candidate(&mut heap, &chars, &symbols, merges, left, next);
        }
    }

    let mut out = Vec::new();
    let mut cur = symbols.iter().position(|s| s.prev.is_none() && s.piece_len > 0);
    while let Some(idx) = cur {
        let sym = &symbols[idx];
        let piece: String = chars[sym.piece_start..sym.piece_start + sym.piece_len]
            .iter()
            .collect();
        let src_index = word_start + sym.piece_start;

        if let Some(id) = vocab.get_id(&piece) {
            out.push(Token {
                id,
                value: piece,
                offset: Offset {
                    index: src_index,
                    length: sym.piece_len,
                },
            });
        } else {
            // Byte fallback: the merged piece has no vocabulary entry, so
            // emit one token per visible char instead.
            for (offset_in_piece, ch) in piece.chars().enumerate() {
                let ch_str = byte_codec::char_to_string(ch);
                let id = vocab.get_id(ch_str.as_ref()).or(unk_id);
                if let Some(id) = id {
                    out.push(Token {
                        id,
                        value: ch_str.into_owned(),
                        offset: Offset {
                            index: src_index + offset_in_piece,
                            length: 1,
                        },
                    });
                }
            }
        }

        cur = sym.next;
    }
    out
}
