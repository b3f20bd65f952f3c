//! Bounded, thread-safe cache from original word text to its encoded
//! tokens. Entries are keyed on the word as it appeared before BPE (not its
//! byte-visible expansion), since the pre-tokenizer is what fixes word
//! boundaries and the cache must be reusable regardless of where in the
//! input a given word recurs.

use crate::Token;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Words longer than this (in bytes) are never cached; most natural-language
/// words are shorter, and capping the key length bounds memory use under
/// adversarial input.
pub const MAX_CACHE_KEY_LEN: usize = 15;

pub struct Cache {
    inner: Mutex<LruCache<String, Arc<[Token]>>>,
}

impl Cache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Token offsets stored here are relative to the start of the word
    /// (caller re-bases them to the word's absolute position).
    pub fn get(&self, key: &str) -> Option<Arc<[Token]>> {
        if key.len() > MAX_CACHE_KEY_LEN {
            return None;
        }
        let mut guard = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        guard.get(key).cloned()
    }

    pub fn put(&self, key: String, value: Arc<[Token]>) {
        if key.len() > MAX_CACHE_KEY_LEN {
            return;
        }
        let mut guard = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        guard.put(key, value);
    }
}
