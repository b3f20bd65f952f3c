//! Orchestration: the public `Tokenizer` facade and its builder.
//!
//! Encode pipeline: optional prefix space -> normalize -> pre-tokenize ->
//! per-word encode (added-tokens / cache / `word_encoder`) -> offset
//! re-basing -> optional BOS/EOS injection. See `word_encoder` for the
//! per-word merge algorithm and `decoder` for the inverse direction.

use crate::added_tokens::AddedTokens;
use crate::cache::{Cache, MAX_CACHE_KEY_LEN};
use crate::decoder;
use crate::merges::MergeTable;
use crate::normalizer::Normalizer;
use crate::occurrence_rank::OccurrenceRankMap;
use crate::pretokenizer::PreTokenizer;
use crate::vocab::VocabStore;
use crate::word_encoder;
use crate::{invariants, Error, Offset, Token, TokenId};
use rayon::prelude::*;
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

/// Selects default pre/post-processing policy; the merge algorithm itself
/// (`word_encoder`) is shared across all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Gpt2,
    CodeGen,
    Roberta,
}

impl Variant {
    fn default_pre_tokenizer(self) -> PreTokenizer {
        match self {
            Variant::Gpt2 | Variant::CodeGen => PreTokenizer::Gpt2,
            Variant::Roberta => PreTokenizer::Roberta,
        }
    }

    fn default_normalizer(self) -> Normalizer {
        Normalizer::Identity
    }

    fn default_add_prefix_space(self) -> bool {
        matches!(self, Variant::Roberta)
    }

    fn default_add_bos(self) -> bool {
        matches!(self, Variant::Roberta)
    }

    fn default_add_eos(self) -> bool {
        matches!(self, Variant::Roberta)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Gpt2 => "gpt2",
            Variant::CodeGen => "codegen",
            Variant::Roberta => "roberta",
        }
    }
}

/// Per-call overrides for `Tokenizer::encode_with`; omitted fields fall back
/// to the tokenizer's construction-time defaults via `Tokenizer::encode`.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    pub add_prefix_space: bool,
    pub add_bos: bool,
    pub add_eos: bool,
    pub consider_pre_tokenization: bool,
    pub consider_normalization: bool,
}

pub struct TokenizerBuilder {
    vocab: VocabStore,
    merges: MergeTable,
    added_tokens: AddedTokens,
    occurrence_ranks: Option<OccurrenceRankMap>,
    variant: Variant,
    pre_tokenizer: Option<PreTokenizer>,
    normalizer: Option<Normalizer>,
    cache_capacity: usize,
    add_prefix_space: Option<bool>,
    add_bos: Option<bool>,
    add_eos: Option<bool>,
    unk_token: Option<String>,
    bos_token: Option<String>,
    eos_token: Option<String>,
}

impl TokenizerBuilder {
    pub fn new(vocab: VocabStore, merges: MergeTable) -> Self {
        Self {
            vocab,
            merges,
            added_tokens: AddedTokens::empty(),
            occurrence_ranks: None,
            variant: Variant::Gpt2,
            pre_tokenizer: None,
            normalizer: None,
            cache_capacity: crate::DEFAULT_CACHE_CAPACITY,
            add_prefix_space: None,
            add_bos: None,
            add_eos: None,
            unk_token: None,
            bos_token: None,
            eos_token: None,
        }
    }

    pub fn from_files<P: AsRef<Path>>(vocab_path: P, merges_path: P) -> Result<Self, Error> {
        let vocab = VocabStore::from_json_file(vocab_path)?;
        let merges = MergeTable::from_file(merges_path)?;
        Ok(Self::new(vocab, merges))
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn added_tokens(mut self, added: AddedTokens) -> Self {
        self.added_tokens = added;
        self
    }

    pub fn occurrence_ranks(mut self, ranks: OccurrenceRankMap) -> Self {
        self.occurrence_ranks = Some(ranks);
        self
    }

    pub fn pre_tokenizer(mut self, pre_tokenizer: PreTokenizer) -> Self {
        self.pre_tokenizer = Some(pre_tokenizer);
        self
    }

    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn add_prefix_space(mut self, value: bool) -> Self {
        self.add_prefix_space = Some(value);
        self
    }

    pub fn add_bos(mut self, value: bool) -> Self {
        self.add_bos = Some(value);
        self
    }

    pub fn add_eos(mut self, value: bool) -> Self {
        self.add_eos = Some(value);
        self
    }

    pub fn unk_token(mut self, token: impl Into<String>) -> Self {
        self.unk_token = Some(token.into());
        self
    }

    pub fn bos_token(mut self, token: impl Into<String>) -> Self {
        self.bos_token = Some(token.into());
        self
    }

    pub fn eos_token(mut self, token: impl Into<String>) -> Self {
        self.eos_token = Some(token.into());
        self
    }

    pub fn build(self) -> Result<Tokenizer, Error> {
        let resolve = |name: &str| -> Result<TokenId, Error> {
            self.vocab.get_id(name).ok_or_else(|| {
                Error::InvalidConfig(format!("special token {name:?} not present in vocabulary"))
            })
        };
        let unk_id = self.unk_token.as_deref().map(resolve).transpose()?;
        let bos_id = self.bos_token.as_deref().map(resolve).transpose()?;
        let eos_id = self.eos_token.as_deref().map(resolve).transpose()?;

        let add_bos = self.add_bos.unwrap_or_else(|| self.variant.default_add_bos());
        let add_eos = self.add_eos.unwrap_or_else(|| self.variant.default_add_eos());
        if add_bos && bos_id.is_none() {
            return Err(Error::InvalidConfig(
                "add_bos is enabled but no bos_token was configured".to_string(),
            ));
        }
        if add_eos && eos_id.is_none() {
            return Err(Error::InvalidConfig(
                "add_eos is enabled but no eos_token was configured".to_string(),
            ));
        }

        let variant = self.variant;
        tracing::debug!(
            variant = variant.as_str(),
            vocab_size = self.vocab.len(),
            merge_rules = self.merges.len(),
            added_tokens = self.added_tokens.len(),
            "constructed tokenizer"
        );

        Ok(Tokenizer {
            vocab: self.vocab,
            merges: self.merges,
            added_tokens: self.added_tokens,
            occurrence_ranks: self.occurrence_ranks,
            pre_tokenizer: self.pre_tokenizer.unwrap_or_else(|| variant.default_pre_tokenizer()),
            normalizer: self.normalizer.unwrap_or_else(|| variant.default_normalizer()),
            cache: Cache::new(self.cache_capacity),
            variant,
            add_prefix_space: self
                .add_prefix_space
                .unwrap_or_else(|| variant.default_add_prefix_space()),
            add_bos,
            add_eos,
            bos_id,
            eos_id,
            unk_id,
        })
    }
}

pub struct Tokenizer {
    vocab: VocabStore,
    merges: MergeTable,
    added_tokens: AddedTokens,
    occurrence_ranks: Option<OccurrenceRankMap>,
    pre_tokenizer: PreTokenizer,
    normalizer: Normalizer,
    cache: Cache,
    variant: Variant,
    add_prefix_space: bool,
    add_bos: bool,
    add_eos: bool,
    bos_id: Option<TokenId>,
    eos_id: Option<TokenId>,
    unk_id: Option<TokenId>,
}

impl Tokenizer {
    pub fn builder(vocab: VocabStore, merges: MergeTable) -> TokenizerBuilder {
        TokenizerBuilder::new(vocab, merges)
    }

    /// Upper bound on valid vocabulary ids (ids may be sparse, so this can
    /// exceed the number of distinct entries `VocabStore::len` reports).
    pub fn vocab_size(&self) -> usize {
        self.vocab.max_id() as usize + 1
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn model_type(&self) -> &'static str {
        self.variant.as_str()
    }

    pub fn bos_token(&self) -> Option<TokenId> {
        self.bos_id
    }

    pub fn eos_token(&self) -> Option<TokenId> {
        self.eos_id
    }

    pub fn unk_token(&self) -> Option<TokenId> {
        self.unk_id
    }

    pub fn occurrence_ranks(&self) -> Option<&OccurrenceRankMap> {
        self.occurrence_ranks.as_ref()
    }

    pub fn map_token_to_id(&self, token: &str) -> Option<TokenId> {
        self.vocab
            .get_id(token)
            .or_else(|| self.added_tokens.get_id(token))
    }

    pub fn map_id_to_token(&self, id: TokenId) -> Option<&str> {
        self.vocab_token_text(id).or_else(|| self.added_token_text(id))
    }

    pub(crate) fn vocab_token_text(&self, id: TokenId) -> Option<&str> {
        self.vocab.get_token(id)
    }

    pub(crate) fn added_token_text(&self, id: TokenId) -> Option<&str> {
        self.added_tokens.get_token(id)
    }

    pub fn is_special_token(&self, id: TokenId) -> bool {
        Some(id) == self.bos_id || Some(id) == self.eos_id || Some(id) == self.unk_id
    }

    fn default_options(&self) -> EncodeOptions {
        EncodeOptions {
            add_prefix_space: self.add_prefix_space,
            add_bos: self.add_bos,
            add_eos: self.add_eos,
            consider_pre_tokenization: true,
            consider_normalization: true,
        }
    }

    /// Encode text with the tokenizer's default policy. `add_special_tokens`
    /// controls BOS/EOS injection only; the convenience most callers reach
    /// for in place of the full `encode_with`/`EncodeOptions` surface.
    pub fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Vec<Token>, Error> {
        let mut opts = self.default_options();
        if add_special_tokens {
            opts.add_bos = self.bos_id.is_some();
            opts.add_eos = self.eos_id.is_some();
        } else {
            opts.add_bos = false;
            opts.add_eos = false;
        }
        self.encode_with(text, &opts)
    }

    pub fn encode_with(&self, text: &str, opts: &EncodeOptions) -> Result<Vec<Token>, Error> {
        if text.len() > crate::MAX_INPUT_SIZE {
            return Err(Error::InvalidArgument(format!(
                "input text too large: {} bytes (max {})",
                text.len(),
                crate::MAX_INPUT_SIZE
            )));
        }

        let prefix_added = opts.add_prefix_space && !text.starts_with(' ');
        let working: Cow<str> = if prefix_added {
            Cow::Owned(format!(" {text}"))
        } else {
            Cow::Borrowed(text)
        };

        let (normalized, _reshaped) = if opts.consider_normalization {
            self.normalizer.normalize(working.as_ref())
        } else {
            (Cow::Borrowed(working.as_ref()), false)
        };

        let spans: Vec<(usize, usize)> = if opts.consider_pre_tokenization {
            self.pre_tokenizer.split(&normalized)?
        } else if normalized.is_empty() {
            Vec::new()
        } else {
            vec![(0, normalized.len())]
        };

        let mut tokens = Vec::new();
        for (start, len) in spans {
            let word = &normalized[start..start + len];
            tokens.extend(self.encode_word(word, start));
            if tokens.len() > crate::MAX_OUTPUT_TOKENS {
                return Err(Error::InvalidArgument(format!(
                    "output would exceed MAX_OUTPUT_TOKENS ({})",
                    crate::MAX_OUTPUT_TOKENS
                )));
            }
        }

        if prefix_added {
            for t in &mut tokens {
                if t.offset.index == 0 {
                    t.offset.length = t.offset.length.saturating_sub(1);
                }
                t.offset.index = t.offset.index.saturating_sub(1);
            }
        }

        if opts.add_bos {
            if let Some(id) = self.bos_id {
                tokens.insert(
                    0,
                    Token {
                        id,
                        value: String::new(),
                        offset: Offset { index: 0, length: 0 },
                    },
                );
            }
        }
        if opts.add_eos {
            if let Some(id) = self.eos_id {
                tokens.push(Token {
                    id,
                    value: String::new(),
                    offset: Offset {
                        index: text.len(),
                        length: 0,
                    },
                });
            }
        }

        invariants::assert_encode_postconditions(&tokens, self.vocab_size(), text.len());
        Ok(tokens)
    }

    fn encode_word(&self, word: &str, word_start: usize) -> Vec<Token> {
        if word.is_empty() {
            return Vec::new();
        }

        if let Some(id) = self.added_tokens.get_id(word) {
            return vec![Token {
                id,
                value: word.to_string(),
                offset: Offset {
                    index: word_start,
                    length: word.len(),
                },
            }];
        }

        let cacheable = word.len() <= MAX_CACHE_KEY_LEN;
        if cacheable {
            if let Some(cached) = self.cache.get(word) {
                return rebase(&cached, word_start);
            }
        }

        let relative = word_encoder::encode_word(word, 0, &self.vocab, &self.merges, self.unk_id);
        if cacheable {
            self.cache.put(word.to_string(), Arc::from(relative.clone()));
        }
        rebase(&relative, word_start)
    }

    pub fn encode_to_ids(&self, text: &str, add_special_tokens: bool) -> Result<Vec<TokenId>, Error> {
        Ok(self
            .encode(text, add_special_tokens)?
            .into_iter()
            .map(|t| t.id)
            .collect())
    }

    pub fn count_tokens(&self, text: &str, add_special_tokens: bool) -> Result<usize, Error> {
        Ok(self.encode(text, add_special_tokens)?.len())
    }

    pub fn encode_to_ids_bounded(
        &self,
        text: &str,
        max_tokens: usize,
        add_special_tokens: bool,
    ) -> Result<(Vec<TokenId>, usize), Error> {
        if max_tokens == 0 {
            return Err(Error::InvalidArgument("max_tokens must be greater than zero".to_string()));
        }
        let tokens = self.encode(text, add_special_tokens)?;
        let (kept, text_length) = truncate_tokens(&tokens, max_tokens, text);
        Ok((kept.iter().map(|t| t.id).collect(), text_length))
    }

    pub fn index_of_token_count(
        &self,
        text: &str,
        max_tokens: usize,
        add_special_tokens: bool,
    ) -> Result<(usize, usize), Error> {
        if max_tokens == 0 {
            return Err(Error::InvalidArgument("max_tokens must be greater than zero".to_string()));
        }
        let tokens = self.encode(text, add_special_tokens)?;
        let (kept, text_length) = truncate_tokens(&tokens, max_tokens, text);
        Ok((text_length, kept.len()))
    }

    pub fn last_index_of_token_count(
        &self,
        text: &str,
        max_tokens: usize,
        add_special_tokens: bool,
    ) -> Result<(usize, usize), Error> {
        if max_tokens == 0 {
            return Err(Error::InvalidArgument("max_tokens must be greater than zero".to_string()));
        }
        let tokens = self.encode(text, add_special_tokens)?;
        let total = tokens.len();
        let mut start_idx = total.saturating_sub(max_tokens);

        // Advance the suffix start forward until it lands on a `char`
        // boundary, so the kept suffix never begins mid-code-point (see
        // `truncate_tokens` for why `offset.index` equality doesn't catch
        // this under byte offsets).
        while start_idx < total && !text.is_char_boundary(tokens[start_idx].offset.index) {
            start_idx += 1;
        }

        let text_index = tokens.get(start_idx).map(|t| t.offset.index).unwrap_or(text.len());
        Ok((text_index, total - start_idx))
    }

    pub fn decode(&self, ids: &[TokenId], consider_special_tokens: bool) -> String {
        decoder::decode(self, ids, consider_special_tokens, self.add_prefix_space)
    }

    pub fn decode_single(&self, id: TokenId, consider_special_tokens: bool) -> String {
        self.decode(&[id], consider_special_tokens)
    }

    pub fn encode_batch(
        &self,
        texts: &[&str],
        add_special_tokens: bool,
    ) -> Result<Vec<Vec<Token>>, Error> {
        texts
            .par_iter()
            .map(|text| self.encode(text, add_special_tokens))
            .collect()
    }

    /// Classifies `id` by surface form: `Unknown` if it's the configured UNK
    /// id, otherwise the vocabulary's own classification (`Normal` for added
    /// tokens, which carry no byte-level shape to classify by).
    pub fn token_type(&self, id: TokenId) -> Option<crate::vocab::TokenKind> {
        if Some(id) == self.unk_id {
            return Some(crate::vocab::TokenKind::Unknown);
        }
        self.vocab
            .token_kind(id)
            .or_else(|| self.added_tokens.get_token(id).map(|_| crate::vocab::TokenKind::Normal))
    }
}

fn rebase(tokens: &[Token], start: usize) -> Vec<Token> {
    tokens
        .iter()
        .cloned()
        .map(|mut t| {
            t.offset.index += start;
            t
        })
        .collect()
}

/// Truncate `tokens` to at most `max_tokens`, never splitting a multi-byte
/// code point: if cutting at `max_tokens` would land the consumed text
/// length in the middle of a code point, the cut moves backward (excluding
/// more tokens) until `text_length` falls on a `char` boundary. Returns the
/// kept prefix and the text length it covers.
///
/// `offset.index` is a UTF-8 byte offset (see DESIGN.md's Open Question
/// resolution), so two tokens that are each one byte of a multi-byte code
/// point never share an `offset.index` the way a UTF-16/index-map model
/// would; `str::is_char_boundary` is the check that actually holds under
/// byte offsets.
fn truncate_tokens<'a>(tokens: &'a [Token], max_tokens: usize, text: &str) -> (&'a [Token], usize) {
    let text_len = text.len();
    if tokens.len() <= max_tokens {
        return (tokens, text_len);
    }
    let mut cut = max_tokens;
    while cut > 0 {
        let candidate = tokens.get(cut).map(|t| t.offset.index).unwrap_or(text_len);
        if text.is_char_boundary(candidate) {
            break;
        }
        cut -= 1;
    }
    let end_text = tokens.get(cut).map(|t| t.offset.index).unwrap_or(text_len);
    (&tokens[..cut], end_text)
}
