//! Error types for conversation crypto operations

use thiserror::Error;

/// Errors from conversation crypto operations.
///
/// Display output never contains plaintext or key material; reasons are
/// limited to lengths and failure categories.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The platform's secure entropy source failed.
    ///
    /// Fatal: no key or nonce can be drawn, the operation cannot proceed.
    #[error("secure randomness unavailable")]
    CryptoUnavailable,

    /// Key material was malformed or had the wrong decoded length.
    #[error("invalid key material: {reason}")]
    InvalidKeyMaterial {
        /// What was wrong with the key (length or encoding, never content).
        reason: String,
    },

    /// The underlying cipher rejected an encryption request.
    ///
    /// Should not happen with a valid key and nonce; indicates a platform
    /// or cipher backend failure.
    #[error("encryption failed")]
    EncryptionFailed,

    /// Payload failed authentication or was structurally unreadable.
    ///
    /// Covers tampered ciphertext, a wrong key, undecodable base64, a
    /// truncated payload, and non-UTF-8 plaintext. All-or-nothing: no
    /// partial plaintext is ever returned.
    #[error("decryption failed: {reason}")]
    DecryptionFailed {
        /// Reason for decryption failure.
        reason: String,
    },
}

impl CryptoError {
    /// Returns true if this error must be surfaced to the caller.
    ///
    /// Generation, import, and encryption failures indicate a setup problem
    /// the caller has to react to (abort sending). Decryption failures are
    /// recoverable at the rendering layer: a single unreadable message is
    /// masked instead of blocking the rest of the conversation.
    pub fn is_surfaced(&self) -> bool {
        match self {
            Self::CryptoUnavailable | Self::InvalidKeyMaterial { .. } | Self::EncryptionFailed => {
                true
            }
            Self::DecryptionFailed { .. } => false,
        }
    }
}
