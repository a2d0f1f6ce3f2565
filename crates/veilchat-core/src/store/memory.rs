#![allow(clippy::expect_used, reason = "Mutex poisoning panics are acceptable for test storage")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use super::{ConversationStore, StoreError};
use crate::records::{ConversationId, ConversationRecord, MessageRecord, UserId};

/// In-memory store implementation for testing and embedding.
///
/// Uses `HashMap` for conversation lookups and Vec for message storage. All
/// state is wrapped in Arc<Mutex<>> to allow Clone and concurrent access.
/// Locks are never held across await points; every method locks, mutates,
/// and releases synchronously.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Conversation records by id.
    conversations: HashMap<ConversationId, ConversationRecord>,

    /// Messages per conversation, in append order. Retrieval sorts by
    /// (timestamp, id) so append order never leaks into the result.
    messages: HashMap<ConversationId, Vec<MessageRecord>>,
}

impl MemoryStore {
    /// Create a new empty `MemoryStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored conversations.
    ///
    /// Useful for debugging and testing.
    pub fn conversation_count(&self) -> usize {
        self.inner.lock().expect("Mutex poisoned").conversations.len()
    }

    /// Total number of messages across all conversations.
    ///
    /// Useful for debugging and testing.
    pub fn message_count(&self) -> usize {
        let inner = self.inner.lock().expect("Mutex poisoned");
        inner.messages.values().map(std::vec::Vec::len).sum()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn create_conversation(&self, record: ConversationRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("Mutex poisoned");

        if inner.conversations.contains_key(&record.id) {
            return Err(StoreError::DuplicateConversation { id: record.id });
        }

        inner.messages.entry(record.id.clone()).or_default();
        inner.conversations.insert(record.id.clone(), record);
        Ok(())
    }

    async fn conversation(&self, id: &ConversationId) -> Result<ConversationRecord, StoreError> {
        let inner = self.inner.lock().expect("Mutex poisoned");
        inner
            .conversations
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::ConversationNotFound { id: id.clone() })
    }

    async fn conversations_for(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConversationRecord>, StoreError> {
        let inner = self.inner.lock().expect("Mutex poisoned");
        let mut records: Vec<ConversationRecord> =
            inner.conversations.values().filter(|c| c.has_participant(user)).cloned().collect();
        // HashMap iteration order is arbitrary; present newest first like the UI does
        records.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn find_direct(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<ConversationRecord>, StoreError> {
        let inner = self.inner.lock().expect("Mutex poisoned");
        Ok(inner.conversations.values().find(|c| c.is_between(a, b)).cloned())
    }

    async fn append_message(&self, message: MessageRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("Mutex poisoned");

        if !inner.conversations.contains_key(&message.conversation_id) {
            return Err(StoreError::ConversationNotFound { id: message.conversation_id });
        }

        let messages = inner.messages.entry(message.conversation_id.clone()).or_default();
        if messages.iter().any(|m| m.id == message.id) {
            return Err(StoreError::DuplicateMessage { id: message.id });
        }

        messages.push(message);
        Ok(())
    }

    async fn messages(&self, id: &ConversationId) -> Result<Vec<MessageRecord>, StoreError> {
        let inner = self.inner.lock().expect("Mutex poisoned");

        if !inner.conversations.contains_key(id) {
            return Err(StoreError::ConversationNotFound { id: id.clone() });
        }

        let mut messages = inner.messages.get(id).cloned().unwrap_or_default();
        messages.sort_by(|a, b| a.timestamp_ms.cmp(&b.timestamp_ms).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn set_last_message_time(
        &self,
        id: &ConversationId,
        timestamp_ms: u64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("Mutex poisoned");
        let record = inner
            .conversations
            .get_mut(id)
            .ok_or_else(|| StoreError::ConversationNotFound { id: id.clone() })?;
        record.last_message_time_ms = Some(timestamp_ms);
        Ok(())
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("Mutex poisoned");

        if inner.conversations.remove(id).is_none() {
            return Err(StoreError::ConversationNotFound { id: id.clone() });
        }

        inner.messages.remove(id);
        Ok(())
    }
}
