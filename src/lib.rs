//! # bytebpe
//!
//! Byte-level BPE tokenizer engine: the GPT-2/CodeGen/RoBERTa family of
//! tokenization, implemented against plain vocabulary/merge-table files
//! rather than any one model-serving format.
//!
//! ## Example
//!
//! ```no_run
//! use bytebpe::{Tokenizer, TokenizerBuilder, Variant, VocabStore, MergeTable};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let vocab = VocabStore::from_json_file("vocab.json")?;
//! let merges = MergeTable::from_file("merges.txt")?;
//! let tokenizer = Tokenizer::builder(vocab, merges)
//!     .variant(Variant::Gpt2)
//!     .build()?;
//!
//! let ids = tokenizer.encode_to_ids("Hello world", false)?;
//! let text = tokenizer.decode(&ids, true);
//! # Ok(())
//! # }
//! ```

pub mod added_tokens;
pub mod byte_codec;
pub mod cache;
pub mod decoder;
mod engine;
mod invariants;
pub mod merges;
pub mod normalizer;
pub mod occurrence_rank;
pub mod pretokenizer;
pub mod vocab;
pub mod word_encoder;

pub use added_tokens::AddedTokens;
pub use engine::{EncodeOptions, Tokenizer, TokenizerBuilder, Variant};
pub use merges::MergeTable;
pub use normalizer::Normalizer;
pub use occurrence_rank::OccurrenceRankMap;
pub use pretokenizer::PreTokenizer;
pub use vocab::{TokenKind, VocabStore};

/// Token ID type used throughout the library, matching common vocabulary-file
/// conventions (u32 comfortably covers any realistic vocabulary size).
pub type TokenId = u32;

/// Maximum input text size in bytes (10MB), guarding against pathological
/// allocations in the pre-tokenizer and merge loop.
pub const MAX_INPUT_SIZE: usize = 10 * 1024 * 1024;

/// Maximum number of tokens a single `encode` call may produce.
pub const MAX_OUTPUT_TOKENS: usize = 1_000_000;

/// Re-exported so callers sizing their own caches can see the default cap.
pub use cache::MAX_CACHE_KEY_LEN;

/// Default capacity (in entries) of a `Tokenizer`'s internal word cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 50_000;

/// A token's position in the original input: a UTF-8 byte index and length.
/// See the crate-level design notes for why byte offsets were chosen over
/// UTF-16 code-unit offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub index: usize,
    pub length: usize,
}

/// One output token: its vocabulary id, its decoded text piece, and the
/// source span it was produced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub id: TokenId,
    pub value: String,
    pub offset: Offset,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
