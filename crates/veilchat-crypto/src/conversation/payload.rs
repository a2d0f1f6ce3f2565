//! Message encryption using AES-256-GCM
//!
//! One payload per message: a fresh 12-byte nonce followed by the ciphertext
//! and 16-byte GCM tag, base64-encoded as a single string. The `_with_nonce`
//! variant is pure so tests can fix the nonce.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::Engine as _;

use super::{BASE64, error::CryptoError, key::ConversationKey};

/// Size of the random nonce prefix in bytes (96 bits).
pub const NONCE_SIZE: usize = 12;

/// GCM authentication tag size in bytes (128 bits).
pub const TAG_SIZE: usize = 16;

/// One plaintext message encrypted under one conversation key.
///
/// Wire form is `base64(nonce || ciphertext || tag)`. The nonce is drawn
/// fresh for every encryption call; reuse under the same key breaks the
/// cipher's confidentiality guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// The 12-byte AES-GCM nonce.
    pub nonce: [u8; NONCE_SIZE],
    /// The ciphertext including the 16-byte GCM tag.
    pub ciphertext: Vec<u8>,
}

impl EncryptedPayload {
    /// Encode as `base64(nonce || ciphertext || tag)` for the message record.
    pub fn encode(&self) -> String {
        let mut combined = Vec::with_capacity(NONCE_SIZE + self.ciphertext.len());
        combined.extend_from_slice(&self.nonce);
        combined.extend_from_slice(&self.ciphertext);
        BASE64.encode(combined)
    }

    /// Decode a wire string back into nonce and ciphertext.
    ///
    /// # Errors
    ///
    /// - `DecryptionFailed`: not valid base64, or shorter than nonce + tag
    pub fn decode(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64.decode(encoded).map_err(|_| CryptoError::DecryptionFailed {
            reason: "payload is not valid base64".to_string(),
        })?;

        if bytes.len() < NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::DecryptionFailed {
                reason: format!("payload too short: {} bytes", bytes.len()),
            });
        }

        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_SIZE);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self { nonce, ciphertext: ciphertext.to_vec() })
    }

    /// Plaintext length (ciphertext length minus authentication tag).
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_SIZE)
    }
}

/// Encrypt a message body under a conversation key.
///
/// Draws a fresh random 12-byte nonce from OS entropy, so encrypting the
/// same plaintext twice under the same key yields different outputs.
///
/// # Errors
///
/// - `CryptoUnavailable`: the platform entropy source failed
/// - `EncryptionFailed`: the cipher rejected the request
pub fn encrypt_message(plaintext: &str, key: &ConversationKey) -> Result<String, CryptoError> {
    let mut nonce = [0u8; NONCE_SIZE];
    getrandom::fill(&mut nonce).map_err(|_| CryptoError::CryptoUnavailable)?;
    encrypt_message_with_nonce(plaintext, key, nonce)
}

/// Encrypt a message body with a caller-provided nonce.
///
/// Pure variant for deterministic testing. The caller MUST provide a
/// cryptographically random nonce in production; [`encrypt_message`] does.
///
/// # Errors
///
/// - `EncryptionFailed`: the cipher rejected the request
pub fn encrypt_message_with_nonce(
    plaintext: &str,
    key: &ConversationKey,
    nonce: [u8; NONCE_SIZE],
) -> Result<String, CryptoError> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| CryptoError::EncryptionFailed)?;

    Ok(EncryptedPayload { nonce, ciphertext }.encode())
}

/// Decrypt a wire-encoded payload under a conversation key.
///
/// All-or-nothing: a tampered payload, a wrong key, or a structurally
/// unreadable string yields an error, never corrupted plaintext. Masking
/// the failure for display is the caller's policy, not this function's.
///
/// # Errors
///
/// - `DecryptionFailed`: authentication failed, the payload was malformed,
///   or the decrypted bytes were not valid UTF-8
pub fn decrypt_message(encoded: &str, key: &ConversationKey) -> Result<String, CryptoError> {
    let payload = EncryptedPayload::decode(encoded)?;

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&payload.nonce), payload.ciphertext.as_slice())
        .map_err(|_| CryptoError::DecryptionFailed {
            reason: "authentication failed".to_string(),
        })?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed {
        reason: "plaintext is not valid UTF-8".to_string(),
    })
}
