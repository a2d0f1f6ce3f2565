//! Client error types.

use thiserror::Error;
use veilchat_core::StoreError;
use veilchat_crypto::CryptoError;

/// Errors that can occur in the conversation service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A conversation needs two distinct participants.
    #[error("conversation participants must be two distinct users")]
    SelfConversation,

    /// Crypto engine failure (key generation, import, or encryption).
    ///
    /// Decryption failures never surface here; they are masked per message.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Document store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
