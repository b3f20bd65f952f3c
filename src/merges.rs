//! Merge-rule table loading: an ordered (left, right) -> rank map parsed
//! from a `merges.txt`-style file.

use crate::Error;
use std::collections::HashMap;
use std::path::Path;

/// Rank-ordered merge rules. Lower rank merges first.
pub struct MergeTable {
    ranks: HashMap<(String, String), usize>,
}

impl MergeTable {
    /// Parse a merges file's contents. The first line is a header comment
    /// and is always skipped, matching the standard GPT-2 `merges.txt`
    /// shape (`#version: 0.2`).
    pub fn from_str(text: &str) -> Result<Self, Error> {
        let mut lines = text.lines();
        lines.next();

        let mut ranks = HashMap::new();
        let mut rank = 0usize;
        for line in lines {
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split(' ');
            let left = parts.next().filter(|s| !s.is_empty());
            let right = parts.next().filter(|s| !s.is_empty());
            let (Some(left), Some(right)) = (left, right) else {
                return Err(Error::InvalidFormat(format!(
                    "malformed merge line: {line:?}"
                )));
            };
            if parts.next().is_some() {
                return Err(Error::InvalidFormat(format!(
                    "malformed merge line: {line:?}"
                )));
            }

            rank += 1;
            ranks.insert((left.to_string(), right.to_string()), rank);
        }

        tracing::debug!(rules = ranks.len(), "loaded merge table");
        Ok(Self { ranks })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    /// Rank of the rule merging `left` and `right`, if one exists.
    pub fn rank(&self, left: &str, right: &str) -> Option<usize> {
        self.ranks.get(&(left.to_string(), right.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}
