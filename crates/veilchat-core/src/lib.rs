//! Veilchat Core
//!
//! Record types shared between participants and the boundary toward the
//! external document store. The store owns persistence, timestamp ordering,
//! and delivery; the crypto engine only ever sees plaintext going in and
//! encoded payloads coming out.
//!
//! # Components
//!
//! - [`ConversationRecord`] / [`MessageRecord`]: document store shapes
//! - [`ConversationStore`]: async boundary trait toward the store
//! - [`MemoryStore`]: in-memory implementation for tests and embedding

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod records;
pub mod store;

pub use records::{ConversationId, ConversationRecord, MessageId, MessageRecord, UserId};
pub use store::{ConversationStore, MemoryStore, StoreError};
