//! Caller-owned cache of decrypted message bodies.

use std::collections::HashMap;

use veilchat_core::MessageId;

/// Cache of decrypted plaintexts keyed by message id.
///
/// Owned by the caller and passed into
/// [`read_history`](crate::ConversationService::read_history), which fills it
/// and skips decryption for ids already present. The engine itself stays
/// stateless; this is the only place plaintext is retained between calls.
///
/// Masked placeholders are cached like any other entry: a payload that
/// failed authentication once will fail again, so there is no point
/// re-running the cipher on every render.
#[derive(Debug, Default)]
pub struct DecryptedCache {
    entries: HashMap<MessageId, String>,
    hits: u64,
}

impl DecryptedCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached plaintext for a message, if present. Counts a hit.
    ///
    /// A hit means a decrypt call was avoided; use [`peek`](Self::peek) for
    /// lookups that should not affect the count.
    pub fn get(&mut self, id: &MessageId) -> Option<&str> {
        let entry = self.entries.get(id).map(String::as_str);
        if entry.is_some() {
            self.hits += 1;
        }
        entry
    }

    /// Cached plaintext for a message, without counting a hit.
    pub fn peek(&self, id: &MessageId) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    /// Whether a message id is cached, without counting a hit.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.entries.contains_key(id)
    }

    /// Store the plaintext (or placeholder) for a message id.
    pub fn insert(&mut self, id: MessageId, plaintext: String) {
        self.entries.insert(id, plaintext);
    }

    /// Drop one entry, e.g. when a message is deleted.
    pub fn remove(&mut self, id: &MessageId) {
        self.entries.remove(id);
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups answered from the cache.
    ///
    /// Useful for debugging and testing.
    pub fn hit_count(&self) -> u64 {
        self.hits
    }
}
