//! Veilchat Cryptographic Primitives
//!
//! Conversation-level authenticated encryption for Veilchat. Stateless
//! operations parameterized by an encoded key. Callers may provide nonces
//! for deterministic testing.
//!
//! # Key Lifecycle
//!
//! Each two-party conversation owns exactly one symmetric key, generated by
//! the initiating party when the conversation record is created. Both
//! participants read the same key from the conversation record for every
//! message exchanged; the key is never rotated and is destroyed with the
//! record.
//!
//! ```text
//! Conversation start
//!        │
//!        ▼
//! ConversationKey (256-bit, base64 in the conversation record)
//!        │
//!        ▼
//! AEAD Encryption (fresh 12-byte nonce per message)
//!        │
//!        ▼
//! EncryptedPayload → base64(nonce || ciphertext || tag)
//! ```
//!
//! # Security
//!
//! Confidentiality and Authenticity:
//! - AES-256-GCM AEAD provides tamper-proof encryption per message
//! - Every encryption call draws a fresh random 96-bit nonce
//! - Failed authentication tag -> reject payload, never partial plaintext
//!
//! Key Isolation:
//! - Keys are generated independently per conversation from OS entropy
//! - A payload encrypted under one conversation's key fails authentication
//!   under every other key
//!
//! Known Limitation:
//! - The conversation record stores the key unwrapped alongside metadata.
//!   Anyone with read access to the record recovers the key. Per-participant
//!   key wrapping is a future hardening, not part of this engine.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod conversation;

pub use conversation::{
    ConversationKey, CryptoError, EncryptedPayload, KEY_SIZE, NONCE_SIZE, TAG_SIZE,
    decrypt_message, encrypt_message, encrypt_message_with_nonce,
};
