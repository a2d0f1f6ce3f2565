//! End-to-end tests for the conversation service against the in-memory
//! store: key lifecycle, send/read round-trips, masking of undecryptable
//! messages, and cache behavior.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use veilchat_client::{
    ClientError, ConversationService, DecryptedCache, UNDECRYPTABLE_PLACEHOLDER,
};
use veilchat_core::{
    ConversationId, ConversationStore, MemoryStore, MessageId, MessageRecord, StoreError, UserId,
};
use veilchat_crypto::{ConversationKey, CryptoError, encrypt_message};

/// Strictly increasing millisecond clock so history order is deterministic.
fn ticking_clock() -> Arc<dyn Fn() -> u64 + Send + Sync> {
    let tick = AtomicU64::new(1_000);
    Arc::new(move || tick.fetch_add(1, Ordering::SeqCst))
}

fn service(store: &Arc<MemoryStore>) -> ConversationService<MemoryStore> {
    ConversationService::with_clock(Arc::clone(store), ticking_clock())
}

fn alice() -> UserId {
    UserId::new("alice")
}

fn bob() -> UserId {
    UserId::new("bob")
}

#[tokio::test]
async fn send_and_read_roundtrip() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let conversation = service.start_conversation(&alice(), &bob()).await.unwrap();

    service.send_message(&conversation.id, &alice(), "hello bob").await.unwrap();
    service.send_message(&conversation.id, &bob(), "hello alice").await.unwrap();
    service.send_message(&conversation.id, &alice(), "").await.unwrap();

    let mut cache = DecryptedCache::new();
    let history = service.read_history(&conversation.id, &mut cache).await.unwrap();

    let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["hello bob", "hello alice", ""]);
    assert_eq!(history[0].sender, alice());
    assert_eq!(history[1].sender, bob());
    assert!(history[0].timestamp_ms < history[1].timestamp_ms);
}

#[tokio::test]
async fn stored_ciphertext_differs_from_plaintext() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let conversation = service.start_conversation(&alice(), &bob()).await.unwrap();
    let sent = service.send_message(&conversation.id, &alice(), "hello world").await.unwrap();

    assert_ne!(sent.encrypted_text, "hello world");

    // The record in the store holds only the encoded payload
    let stored = store.messages(&conversation.id).await.unwrap();
    assert_eq!(stored[0].encrypted_text, sent.encrypted_text);
    assert!(!stored[0].encrypted_text.contains("hello"));
}

#[tokio::test]
async fn start_conversation_is_idempotent_per_pair() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let first = service.start_conversation(&alice(), &bob()).await.unwrap();
    let second = service.start_conversation(&bob(), &alice()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.encryption_key, second.encryption_key);
    assert_eq!(store.conversation_count(), 1);
}

#[tokio::test]
async fn distinct_conversations_get_independent_keys() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let ab = service.start_conversation(&alice(), &bob()).await.unwrap();
    let ac = service.start_conversation(&alice(), &UserId::new("carol")).await.unwrap();

    assert_ne!(ab.encryption_key, ac.encryption_key);
}

#[tokio::test]
async fn self_conversation_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let result = service.start_conversation(&alice(), &alice()).await;
    assert!(matches!(result, Err(ClientError::SelfConversation)));
}

#[tokio::test]
async fn foreign_key_message_is_masked_not_fatal() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let conversation = service.start_conversation(&alice(), &bob()).await.unwrap();
    service.send_message(&conversation.id, &alice(), "readable one").await.unwrap();

    // A payload encrypted under some other conversation's key slips in
    let foreign_key = ConversationKey::generate().unwrap();
    let poisoned = encrypt_message("you cannot read this", &foreign_key).unwrap();
    store
        .append_message(MessageRecord {
            id: MessageId::new("poisoned"),
            conversation_id: conversation.id.clone(),
            sender: bob(),
            encrypted_text: poisoned,
            timestamp_ms: 5_000,
        })
        .await
        .unwrap();

    service.send_message(&conversation.id, &bob(), "readable two").await.unwrap();

    let mut cache = DecryptedCache::new();
    let history = service.read_history(&conversation.id, &mut cache).await.unwrap();

    assert_eq!(history.len(), 3);
    let poisoned_entry = history.iter().find(|m| m.id == MessageId::new("poisoned")).unwrap();
    assert_eq!(poisoned_entry.text, UNDECRYPTABLE_PLACEHOLDER);

    let readable: Vec<&str> = history
        .iter()
        .filter(|m| m.id != MessageId::new("poisoned"))
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(readable, ["readable one", "readable two"]);
}

#[tokio::test]
async fn tampered_payload_is_masked_not_fatal() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let conversation = service.start_conversation(&alice(), &bob()).await.unwrap();
    service.send_message(&conversation.id, &alice(), "intact").await.unwrap();

    store
        .append_message(MessageRecord {
            id: MessageId::new("garbled"),
            conversation_id: conversation.id.clone(),
            sender: bob(),
            encrypted_text: "*** not even base64 ***".to_string(),
            timestamp_ms: 5_000,
        })
        .await
        .unwrap();

    let mut cache = DecryptedCache::new();
    let history = service.read_history(&conversation.id, &mut cache).await.unwrap();

    assert_eq!(history[0].text, "intact");
    assert_eq!(history[1].text, UNDECRYPTABLE_PLACEHOLDER);
}

#[tokio::test]
async fn second_read_is_served_from_cache() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let conversation = service.start_conversation(&alice(), &bob()).await.unwrap();
    for text in ["one", "two", "three"] {
        service.send_message(&conversation.id, &alice(), text).await.unwrap();
    }

    let mut cache = DecryptedCache::new();
    let first = service.read_history(&conversation.id, &mut cache).await.unwrap();
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.hit_count(), 0);

    let second = service.read_history(&conversation.id, &mut cache).await.unwrap();
    assert_eq!(first, second);
    // Every message was answered from the cache, no decrypt calls made
    assert_eq!(cache.hit_count(), 3);
}

#[tokio::test]
async fn corrupted_conversation_key_aborts_sending() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let mut conversation = service.start_conversation(&alice(), &bob()).await.unwrap();
    store.delete_conversation(&conversation.id).await.unwrap();
    conversation.encryption_key = "dG9vIHNob3J0".to_string();
    store.create_conversation(conversation.clone()).await.unwrap();

    let result = service.send_message(&conversation.id, &alice(), "hello").await;
    assert!(matches!(
        result,
        Err(ClientError::Crypto(CryptoError::InvalidKeyMaterial { .. }))
    ));
}

#[tokio::test]
async fn corrupted_conversation_key_masks_whole_history() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let conversation = service.start_conversation(&alice(), &bob()).await.unwrap();
    service.send_message(&conversation.id, &alice(), "soon unreadable").await.unwrap();

    // Simulate a key-rotation gap: the record's key no longer matches
    let messages = store.messages(&conversation.id).await.unwrap();
    store.delete_conversation(&conversation.id).await.unwrap();
    let mut rekeyed = conversation.clone();
    rekeyed.encryption_key = ConversationKey::generate().unwrap().to_base64();
    store.create_conversation(rekeyed).await.unwrap();
    for message in messages {
        store.append_message(message).await.unwrap();
    }

    let mut cache = DecryptedCache::new();
    let history = service.read_history(&conversation.id, &mut cache).await.unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].text, UNDECRYPTABLE_PLACEHOLDER);
}

#[tokio::test]
async fn send_to_missing_conversation_fails() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let result = service.send_message(&ConversationId::new("nope"), &alice(), "hello").await;
    assert!(matches!(
        result,
        Err(ClientError::Store(StoreError::ConversationNotFound { .. }))
    ));
}

#[tokio::test]
async fn sending_updates_last_message_time() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let conversation = service.start_conversation(&alice(), &bob()).await.unwrap();
    assert_eq!(conversation.last_message_time_ms, None);

    let sent = service.send_message(&conversation.id, &alice(), "ping").await.unwrap();

    let reloaded = store.conversation(&conversation.id).await.unwrap();
    assert_eq!(reloaded.last_message_time_ms, Some(sent.timestamp_ms));
}

#[tokio::test]
async fn delete_conversation_destroys_key_and_messages() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let conversation = service.start_conversation(&alice(), &bob()).await.unwrap();
    service.send_message(&conversation.id, &alice(), "bye").await.unwrap();

    service.delete_conversation(&conversation.id).await.unwrap();

    assert_eq!(store.conversation_count(), 0);
    assert_eq!(store.message_count(), 0);
    let result = service.read_history(&conversation.id, &mut DecryptedCache::new()).await;
    assert!(matches!(
        result,
        Err(ClientError::Store(StoreError::ConversationNotFound { .. }))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn long_history_decrypts_concurrently_in_order() {
    let store = Arc::new(MemoryStore::new());
    let service = service(&store);

    let conversation = service.start_conversation(&alice(), &bob()).await.unwrap();
    let expected: Vec<String> = (0..50).map(|i| format!("message {i}")).collect();
    for text in &expected {
        service.send_message(&conversation.id, &alice(), text).await.unwrap();
    }

    let mut cache = DecryptedCache::new();
    let history = service.read_history(&conversation.id, &mut cache).await.unwrap();

    // Completion order of the decrypt tasks is arbitrary; attribution by
    // message id must still yield the store's timestamp order.
    let texts: Vec<String> = history.iter().map(|m| m.text.clone()).collect();
    assert_eq!(texts, expected);
}
