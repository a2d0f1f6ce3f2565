//! Store boundary error types.

use thiserror::Error;

use crate::records::{ConversationId, MessageId};

/// Errors from document store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No conversation record with the given id.
    #[error("conversation not found: {id}")]
    ConversationNotFound {
        /// The id that was not found.
        id: ConversationId,
    },

    /// A conversation record with this id already exists.
    #[error("conversation already exists: {id}")]
    DuplicateConversation {
        /// The conflicting conversation id.
        id: ConversationId,
    },

    /// A message record with this id already exists in the conversation.
    #[error("message already exists: {id}")]
    DuplicateMessage {
        /// The conflicting message id.
        id: MessageId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::ConversationNotFound { id: ConversationId::new("conv-9") };
        assert_eq!(err.to_string(), "conversation not found: conv-9");
    }
}
