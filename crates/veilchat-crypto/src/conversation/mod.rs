//! Conversation key management and message payload encryption.

mod error;
mod key;
mod payload;

pub use error::CryptoError;
pub use key::{ConversationKey, KEY_SIZE};
pub use payload::{
    EncryptedPayload, NONCE_SIZE, TAG_SIZE, decrypt_message, encrypt_message,
    encrypt_message_with_nonce,
};

/// Base64 engine for key and payload wire encoding.
///
/// Standard alphabet with padding, matching what both participants store in
/// the shared document store.
pub(crate) const BASE64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;
