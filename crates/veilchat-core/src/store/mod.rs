//! Document store boundary.
//!
//! The external store is a managed, continuously-pushed document service.
//! This trait captures the exact surface the engine needs from it; transport
//! security, authentication, presence, and blocking state stay on the other
//! side of the boundary.

mod error;
mod memory;

use async_trait::async_trait;

pub use error::StoreError;
pub use memory::MemoryStore;

use crate::records::{ConversationId, ConversationRecord, MessageRecord, UserId};

/// Boundary toward the external document store.
///
/// Implementations own persistence, ordering, and delivery. All methods are
/// independent units of work with no ordering requirement between concurrent
/// calls; callers attribute results by identifier, not completion order.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persist a newly created conversation record.
    ///
    /// # Errors
    ///
    /// - `DuplicateConversation`: a record with this id already exists
    async fn create_conversation(&self, record: ConversationRecord) -> Result<(), StoreError>;

    /// Load one conversation record by id.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound`: no record with this id
    async fn conversation(&self, id: &ConversationId) -> Result<ConversationRecord, StoreError>;

    /// All conversations the given user takes part in.
    async fn conversations_for(&self, user: &UserId) -> Result<Vec<ConversationRecord>, StoreError>;

    /// The existing conversation between an unordered pair of users, if any.
    ///
    /// Conversation start checks this first so a pair never ends up with two
    /// records (and two keys) for the same relationship.
    async fn find_direct(
        &self,
        a: &UserId,
        b: &UserId,
    ) -> Result<Option<ConversationRecord>, StoreError>;

    /// Persist one message record.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound`: the message's conversation does not exist
    /// - `DuplicateMessage`: a message with this id already exists
    async fn append_message(&self, message: MessageRecord) -> Result<(), StoreError>;

    /// All messages of a conversation, ascending by timestamp.
    ///
    /// Ties are broken by message id so the order is total and stable.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound`: no record with this id
    async fn messages(&self, id: &ConversationId) -> Result<Vec<MessageRecord>, StoreError>;

    /// Record the timestamp of the most recent message.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound`: no record with this id
    async fn set_last_message_time(
        &self,
        id: &ConversationId,
        timestamp_ms: u64,
    ) -> Result<(), StoreError>;

    /// Delete a conversation record and all of its messages.
    ///
    /// This is the destruction point of the conversation key.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound`: no record with this id
    async fn delete_conversation(&self, id: &ConversationId) -> Result<(), StoreError>;
}
