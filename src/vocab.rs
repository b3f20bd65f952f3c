//! Vocabulary loading: token <-> id bijection loaded from a JSON object.

use crate::{Error, TokenId};
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Classification of a vocabulary entry, mirrored for introspection callers
/// that want to distinguish ordinary pieces from control/unknown markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Normal,
    Unknown,
    Control,
    Byte,
}

/// An immutable, bijective token <-> id map.
pub struct VocabStore {
    token_to_id: HashMap<String, TokenId>,
    id_to_token: Vec<Option<String>>,
}

/// Wrapper whose `Deserialize` impl rejects duplicate JSON object keys.
///
/// `serde_json`'s default `HashMap` deserialization silently keeps the last
/// value for a repeated key; a visitor over `visit_map` is the only way to
/// observe the duplicate before it is collapsed away.
struct DupCheckedMap(HashMap<String, TokenId>);

impl<'de> Deserialize<'de> for DupCheckedMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MapVisitor;

        impl<'de> Visitor<'de> for MapVisitor {
            type Value = DupCheckedMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object mapping token strings to integer ids")
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut out = HashMap::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, TokenId>()? {
                    if out.insert(key.clone(), value).is_some() {
                        return Err(de::Error::custom(format!(
                            "duplicate vocabulary key: {key:?}"
                        )));
                    }
                }
                Ok(DupCheckedMap(out))
            }
        }

        deserializer.deserialize_map(MapVisitor)
    }
}

impl VocabStore {
    /// Load a vocabulary from a JSON object string.
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let DupCheckedMap(token_to_id) = serde_json::from_str(json)?;

        if token_to_id.is_empty() {
            return Err(Error::InvalidFormat("vocabulary is empty".to_string()));
        }

        let max_id = token_to_id.values().copied().max().unwrap_or(0);
        let mut id_to_token: Vec<Option<String>> = vec![None; max_id as usize + 1];
        for (token, id) in &token_to_id {
            id_to_token[*id as usize] = Some(token.clone());
        }

        tracing::debug!(entries = token_to_id.len(), "loaded vocabulary");
        Ok(Self {
            token_to_id,
            id_to_token,
        })
    }

    /// Load a vocabulary from a JSON file on disk.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn get_id(&self, token: &str) -> Option<TokenId> {
        self.token_to_id.get(token).copied()
    }

    pub fn get_token(&self, id: TokenId) -> Option<&str> {
        self.id_to_token.get(id as usize)?.as_deref()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.token_to_id.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.token_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_to_id.is_empty()
    }

    /// Highest id assigned to any vocabulary entry; ids may be sparse.
    pub fn max_id(&self) -> TokenId {
        self.id_to_token.len().saturating_sub(1) as TokenId
    }

    /// Classifies a vocabulary entry by its surface form. `Unknown` is never
    /// produced here since the vocabulary alone doesn't know which id (if
    /// any) a tokenizer configured as its UNK token; `Tokenizer::token_type`
    /// layers that on top.
    pub fn token_kind(&self, id: TokenId) -> Option<TokenKind> {
        let token = self.get_token(id)?;
        let mut chars = token.chars();
        let first = chars.next()?;
        if chars.next().is_some() {
            return Some(TokenKind::Normal);
        }
        if crate::byte_codec::is_remapped_control_byte(first) {
            Some(TokenKind::Control)
        } else if crate::byte_codec::unicode_to_bytes().contains_key(&first) {
            Some(TokenKind::Byte)
        } else {
            Some(TokenKind::Normal)
        }
    }
}
