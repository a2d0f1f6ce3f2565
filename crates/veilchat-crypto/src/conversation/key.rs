//! Conversation key generation and wire encoding.

use std::fmt;

use base64::Engine as _;
use zeroize::Zeroize;

use super::{BASE64, error::CryptoError};

/// Size of a conversation key in bytes (256 bits).
pub const KEY_SIZE: usize = 32;

/// The shared symmetric secret for one two-party conversation.
///
/// Generated once by the initiating party when the conversation is created,
/// then read by both participants for every message in that conversation.
/// Never rotated; destroyed when the conversation record is deleted.
///
/// # Invariants
///
/// - `from_base64(key.to_base64())` reproduces the key byte for byte
/// - Two generated keys are cryptographically independent
#[derive(Clone)]
pub struct ConversationKey {
    /// The 32-byte symmetric key for AES-256-GCM.
    bytes: [u8; KEY_SIZE],
}

impl ConversationKey {
    /// Generate a fresh conversation key from OS entropy.
    ///
    /// # Errors
    ///
    /// - `CryptoUnavailable`: the platform entropy source failed
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; KEY_SIZE];
        getrandom::fill(&mut bytes).map_err(|_| CryptoError::CryptoUnavailable)?;
        Ok(Self { bytes })
    }

    /// Construct a key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Import a key from its base64 wire encoding.
    ///
    /// Accepts exactly the encoding [`to_base64`](Self::to_base64) produces.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyMaterial`: not valid base64, or decoded length != 32
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let decoded = BASE64.decode(encoded).map_err(|_| CryptoError::InvalidKeyMaterial {
            reason: "not valid base64".to_string(),
        })?;

        if decoded.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyMaterial {
                reason: format!("wrong length: expected {KEY_SIZE}, got {}", decoded.len()),
            });
        }

        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&decoded);
        Ok(Self { bytes })
    }

    /// Export the key as a base64 string for the conversation record.
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.bytes)
    }

    /// Raw 32-byte key for the AEAD cipher.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

// Implement Drop to zeroize key material
impl Drop for ConversationKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

// Manual Debug so key material never reaches logs
impl fmt::Debug for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConversationKey(..)")
    }
}
