//! Added tokens: whole-word strings that bypass BPE entirely.

use crate::{Error, TokenId};
use std::collections::HashMap;
use std::path::Path;

#[derive(Default)]
pub struct AddedTokens {
    token_to_id: HashMap<String, TokenId>,
    id_to_token: HashMap<TokenId, String>,
}

impl AddedTokens {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let token_to_id: HashMap<String, TokenId> = serde_json::from_str(json)?;
        let id_to_token = token_to_id.iter().map(|(k, &v)| (v, k.clone())).collect();
        Ok(Self {
            token_to_id,
            id_to_token,
        })
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Id of `word` if it matches an added token exactly (whole word only).
    pub fn get_id(&self, word: &str) -> Option<TokenId> {
        self.token_to_id.get(word).copied()
    }

    pub fn get_token(&self, id: TokenId) -> Option<&str> {
        self.id_to_token.get(&id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.token_to_id.is_empty()
    }

    pub fn len(&self) -> usize {
        self.token_to_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_whole_word_only() {
        let added = AddedTokens::from_json_str(r#"{"<|endoftext|>": 50256}"#).unwrap();
        assert_eq!(added.get_id("<|endoftext|>"), Some(50256));
        assert_eq!(added.get_id("<|endoftext|"), None);
        assert_eq!(added.get_token(50256), Some("<|endoftext|>"));
    }

    #[test]
    fn empty_map_never_matches() {
        let added = AddedTokens::empty();
        assert!(added.is_empty());
        assert_eq!(added.get_id("anything"), None);
    }
}
