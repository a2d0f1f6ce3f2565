//! Conversation and message record shapes.
//!
//! These mirror the documents the external store holds. The conversation
//! record carries the base64-encoded conversation key, written once at
//! creation and never mutated; the message record carries the encoded
//! payload plus sender and timestamp for ordering.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a chat user in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap a document store user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a conversation document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationId(String);

impl ConversationId {
    /// Wrap a document store conversation id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a message document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Wrap a document store message id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One two-party conversation document.
///
/// # Invariants
///
/// - Exactly two distinct participants
/// - `encryption_key` is written once at creation and never mutated
/// - The key lives as long as this record; deleting the record destroys it
///
/// Storing the key unwrapped next to the metadata is a known limitation of
/// the source design, carried as-is rather than silently fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Document id of this conversation.
    pub id: ConversationId,
    /// The two participants, initiator first.
    pub participants: [UserId; 2],
    /// Base64-encoded conversation key shared by both participants.
    pub encryption_key: String,
    /// The participant who started the conversation and generated the key.
    pub initiator: UserId,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at_ms: u64,
    /// Timestamp of the most recent message, if any.
    pub last_message_time_ms: Option<u64>,
}

impl ConversationRecord {
    /// Whether the given user takes part in this conversation.
    pub fn has_participant(&self, user: &UserId) -> bool {
        self.participants.iter().any(|p| p == user)
    }

    /// The other participant, from one participant's point of view.
    ///
    /// Returns `None` if `me` is not part of this conversation.
    pub fn other_participant(&self, me: &UserId) -> Option<&UserId> {
        if !self.has_participant(me) {
            return None;
        }
        self.participants.iter().find(|p| *p != me)
    }

    /// Whether this conversation is between the given unordered pair.
    pub fn is_between(&self, a: &UserId, b: &UserId) -> bool {
        (self.participants[0] == *a && self.participants[1] == *b)
            || (self.participants[0] == *b && self.participants[1] == *a)
    }
}

/// One message document.
///
/// The store is responsible for persistence and retrieval ordered by
/// `timestamp_ms`; the engine only reads `encrypted_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Document id of this message.
    pub id: MessageId,
    /// Conversation this message belongs to.
    pub conversation_id: ConversationId,
    /// The sending participant.
    pub sender: UserId,
    /// Base64-encoded encrypted payload (nonce || ciphertext || tag).
    pub encrypted_text: String,
    /// Send time, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ConversationRecord {
        ConversationRecord {
            id: ConversationId::new("conv-1"),
            participants: [UserId::new("alice"), UserId::new("bob")],
            encryption_key: "a2V5".to_string(),
            initiator: UserId::new("alice"),
            created_at_ms: 1_000,
            last_message_time_ms: None,
        }
    }

    #[test]
    fn other_participant_from_either_side() {
        let conv = record();
        assert_eq!(conv.other_participant(&UserId::new("alice")), Some(&UserId::new("bob")));
        assert_eq!(conv.other_participant(&UserId::new("bob")), Some(&UserId::new("alice")));
    }

    #[test]
    fn other_participant_for_outsider_is_none() {
        let conv = record();
        assert_eq!(conv.other_participant(&UserId::new("mallory")), None);
    }

    #[test]
    fn is_between_ignores_order() {
        let conv = record();
        assert!(conv.is_between(&UserId::new("alice"), &UserId::new("bob")));
        assert!(conv.is_between(&UserId::new("bob"), &UserId::new("alice")));
        assert!(!conv.is_between(&UserId::new("alice"), &UserId::new("mallory")));
    }
}
