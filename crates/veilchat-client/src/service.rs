//! Conversation service: start, send, read, delete.

use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use tokio::task::JoinSet;
use veilchat_core::{
    ConversationId, ConversationRecord, ConversationStore, MessageId, MessageRecord, UserId,
};
use veilchat_crypto::{ConversationKey, CryptoError, decrypt_message, encrypt_message};

use crate::{cache::DecryptedCache, error::ClientError};

/// Fixed text shown for a message that could not be decrypted.
///
/// Rendering stays resilient: one corrupted or cross-keyed message displays
/// this placeholder instead of blocking the rest of the conversation.
pub const UNDECRYPTABLE_PLACEHOLDER: &str = "[message could not be decrypted]";

/// One message of a conversation history, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedMessage {
    /// Document id of the message.
    pub id: MessageId,
    /// The sending participant.
    pub sender: UserId,
    /// Send time, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
    /// Decrypted body, or [`UNDECRYPTABLE_PLACEHOLDER`].
    pub text: String,
}

/// Clock used to stamp records, injectable for deterministic tests.
type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Drives the conversation crypto engine against a document store.
///
/// The service holds no per-conversation state. Every operation loads the
/// conversation record, imports its key, and runs the engine; plaintext is
/// only retained in the caller-owned [`DecryptedCache`].
pub struct ConversationService<S> {
    store: Arc<S>,
    now_ms: Clock,
}

impl<S: ConversationStore + 'static> ConversationService<S> {
    /// Create a service stamping records with the system clock.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, Arc::new(system_now_ms))
    }

    /// Create a service with an injected clock (deterministic tests).
    pub fn with_clock(store: Arc<S>, now_ms: Clock) -> Self {
        Self { store, now_ms }
    }

    /// Start a conversation between two users, generating its key.
    ///
    /// If a conversation between the pair already exists it is returned
    /// unchanged, so a pair never holds two keys. Otherwise a fresh
    /// 256-bit key is generated and persisted on the new record.
    ///
    /// # Errors
    ///
    /// - `SelfConversation`: `initiator` and `peer` are the same user
    /// - `Crypto`: the platform entropy source failed
    /// - `Store`: the record could not be persisted
    pub async fn start_conversation(
        &self,
        initiator: &UserId,
        peer: &UserId,
    ) -> Result<ConversationRecord, ClientError> {
        if initiator == peer {
            return Err(ClientError::SelfConversation);
        }

        if let Some(existing) = self.store.find_direct(initiator, peer).await? {
            return Ok(existing);
        }

        let key = ConversationKey::generate()?;
        let record = ConversationRecord {
            id: ConversationId::new(mint_id()?),
            participants: [initiator.clone(), peer.clone()],
            encryption_key: key.to_base64(),
            initiator: initiator.clone(),
            created_at_ms: (self.now_ms)(),
            last_message_time_ms: None,
        };

        self.store.create_conversation(record.clone()).await?;
        tracing::debug!(conversation_id = %record.id, "conversation started");
        Ok(record)
    }

    /// Encrypt a message body and persist it to the conversation.
    ///
    /// # Errors
    ///
    /// - `Crypto`: key import or encryption failed (the send is aborted)
    /// - `Store`: the conversation does not exist or the append failed
    pub async fn send_message(
        &self,
        conversation_id: &ConversationId,
        sender: &UserId,
        text: &str,
    ) -> Result<MessageRecord, ClientError> {
        let record = self.store.conversation(conversation_id).await?;

        let key = ConversationKey::from_base64(&record.encryption_key)?;
        let encrypted_text = encrypt_message(text, &key)?;

        let message = MessageRecord {
            id: MessageId::new(mint_id()?),
            conversation_id: conversation_id.clone(),
            sender: sender.clone(),
            encrypted_text,
            timestamp_ms: (self.now_ms)(),
        };

        self.store.append_message(message.clone()).await?;
        self.store.set_last_message_time(conversation_id, message.timestamp_ms).await?;
        Ok(message)
    }

    /// Load and decrypt a conversation's history for display.
    ///
    /// Every message not already in `cache` is decrypted as an independent
    /// concurrent unit of work; results are attributed back by message id,
    /// never by completion order. A message that fails decryption resolves
    /// to [`UNDECRYPTABLE_PLACEHOLDER`] and the cause is logged; the rest of
    /// the history still renders. The returned list keeps the store's
    /// timestamp order.
    ///
    /// # Errors
    ///
    /// - `Store`: the conversation or its messages could not be loaded
    pub async fn read_history(
        &self,
        conversation_id: &ConversationId,
        cache: &mut DecryptedCache,
    ) -> Result<Vec<DecryptedMessage>, ClientError> {
        let record = self.store.conversation(conversation_id).await?;
        let messages = self.store.messages(conversation_id).await?;

        let mut tasks = JoinSet::new();
        for message in &messages {
            // A cache hit means this message needs no decrypt call at all
            if cache.get(&message.id).is_some() {
                continue;
            }

            // Each task imports its own key handle; nothing is shared.
            let key_base64 = record.encryption_key.clone();
            let id = message.id.clone();
            let encrypted_text = message.encrypted_text.clone();
            tasks.spawn(async move {
                let result = ConversationKey::from_base64(&key_base64)
                    .and_then(|key| decrypt_message(&encrypted_text, &key));
                (id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(plaintext))) => cache.insert(id, plaintext),
                Ok((id, Err(cause))) => {
                    tracing::warn!(message_id = %id, %cause, "masking undecryptable message");
                    cache.insert(id, UNDECRYPTABLE_PLACEHOLDER.to_string());
                }
                Err(join_error) => {
                    // Task was cancelled or panicked; the message stays
                    // uncached and falls back to the placeholder below.
                    tracing::warn!(%join_error, "decrypt task did not complete");
                }
            }
        }

        let mut history = Vec::with_capacity(messages.len());
        for message in messages {
            let text = cache
                .peek(&message.id)
                .map_or_else(|| UNDECRYPTABLE_PLACEHOLDER.to_string(), str::to_string);
            history.push(DecryptedMessage {
                id: message.id,
                sender: message.sender,
                timestamp_ms: message.timestamp_ms,
                text,
            });
        }
        Ok(history)
    }

    /// Delete a conversation, its messages, and with them its key.
    ///
    /// # Errors
    ///
    /// - `Store`: the conversation does not exist
    pub async fn delete_conversation(&self, id: &ConversationId) -> Result<(), ClientError> {
        self.store.delete_conversation(id).await?;
        tracing::debug!(conversation_id = %id, "conversation deleted");
        Ok(())
    }
}

/// Milliseconds since the Unix epoch from the system clock.
fn system_now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis() as u64)
}

/// Mint a random 128-bit document id, hex-encoded.
fn mint_id() -> Result<String, CryptoError> {
    let mut bytes = [0u8; 16];
    getrandom::fill(&mut bytes).map_err(|_| CryptoError::CryptoUnavailable)?;
    Ok(bytes.iter().map(|b| format!("{b:02x}")).collect())
}
