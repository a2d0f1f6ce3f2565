//! Veilchat Client
//!
//! Asynchronous driver tying the conversation crypto engine to the document
//! store boundary. The engine stays stateless; this crate owns the policy
//! around it: key creation at conversation start, encrypt-then-persist on
//! send, and resilient batch decryption when rendering a history.
//!
//! # Components
//!
//! - [`ConversationService`]: start, send, read, delete
//! - [`DecryptedCache`]: caller-owned plaintext cache keyed by message id
//!
//! # Failure policy
//!
//! Key generation, key import, and encryption failures surface to the caller
//! because they indicate a setup problem (abort sending). A message that
//! fails decryption is masked with [`UNDECRYPTABLE_PLACEHOLDER`] and logged,
//! so one corrupted message never blocks rendering the rest of the
//! conversation.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cache;
mod error;
mod service;

pub use cache::DecryptedCache;
pub use error::ClientError;
pub use service::{ConversationService, DecryptedMessage, UNDECRYPTABLE_PLACEHOLDER};
