//! RoBERTa-only occurrence-rank overlay: id <-> corpus-frequency rank, plus
//! a raw occurrence-count lookup. Loaded from a `token count` dictionary
//! file whose line order defines the rank.

use crate::vocab::VocabStore;
use crate::{Error, TokenId};
use std::collections::HashMap;
use std::path::Path;

pub struct OccurrenceRankMap {
    id_to_rank: HashMap<TokenId, usize>,
    rank_to_id: Vec<TokenId>,
    id_to_count: HashMap<TokenId, u64>,
}

impl OccurrenceRankMap {
    pub fn from_str(text: &str, vocab: &VocabStore) -> Result<Self, Error> {
        let mut rank_to_id = Vec::new();
        let mut id_to_rank = HashMap::new();
        let mut id_to_count = HashMap::new();

        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let token = parts.next().ok_or_else(|| {
                Error::InvalidFormat(format!("malformed dictionary line {line_no}"))
            })?;
            let count_str = parts.next().ok_or_else(|| {
                Error::InvalidFormat(format!("malformed dictionary line {line_no}"))
            })?;
            let count: u64 = count_str.parse().map_err(|_| {
                Error::InvalidFormat(format!(
                    "non-numeric occurrence count on line {line_no}: {count_str:?}"
                ))
            })?;
            let id = vocab.get_id(token).ok_or_else(|| {
                Error::InvalidFormat(format!(
                    "dictionary token not present in vocabulary: {token:?}"
                ))
            })?;

            let rank = rank_to_id.len();
            rank_to_id.push(id);
            id_to_rank.insert(id, rank);
            id_to_count.insert(id, count);
        }

        Ok(Self {
            id_to_rank,
            rank_to_id,
            id_to_count,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P, vocab: &VocabStore) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_str(&text, vocab)
    }

    pub fn rank_of(&self, id: TokenId) -> Option<usize> {
        self.id_to_rank.get(&id).copied()
    }

    pub fn id_at_rank(&self, rank: usize) -> Option<TokenId> {
        self.rank_to_id.get(rank).copied()
    }

    pub fn count_of(&self, id: TokenId) -> Option<u64> {
        self.id_to_count.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_bijection_ordered_by_line() {
        let vocab = VocabStore::from_json_str(r#"{"the": 0, "dog": 1, "cat": 2}"#).unwrap();
        let ranks = OccurrenceRankMap::from_str("the 9001\ncat 42\n", &vocab).unwrap();
        assert_eq!(ranks.rank_of(0), Some(0));
        assert_eq!(ranks.rank_of(2), Some(1));
        assert_eq!(ranks.id_at_rank(1), Some(2));
        assert_eq!(ranks.count_of(0), Some(9001));
        assert_eq!(ranks.rank_of(1), None);
    }

    #[test]
    fn rejects_token_missing_from_vocabulary() {
        let vocab = VocabStore::from_json_str(r#"{"the": 0}"#).unwrap();
        let err = OccurrenceRankMap::from_str("ghost 1\n", &vocab).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }
}
