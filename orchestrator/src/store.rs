//! Conversation Store: append/get/clear/list/count over a conversation's
//! message history. Modeled on the teacher's `ConversationStorage` trait —
//! an async trait object behind an `Arc`, with an in-memory reference
//! implementation rather than a required external database, since
//! horizontal persistence is explicitly out of scope.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::conversation::{Conversation, ConversationId, Message};
use crate::error::StoreError;

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create(&self) -> ConversationId;

    async fn append(&self, id: &ConversationId, message: Message) -> Result<(), StoreError>;

    async fn get(&self, id: &ConversationId) -> Result<Conversation, StoreError>;

    async fn clear(&self, id: &ConversationId) -> Result<(), StoreError>;

    async fn list(&self) -> Vec<ConversationId>;

    async fn count(&self, id: &ConversationId) -> Result<usize, StoreError>;
}

/// In-memory reference implementation. Cross-turn interleaving — two turns
/// appending to the same conversation concurrently — is explicitly
/// permitted by the design; `DashMap` gives per-shard locking so concurrent
/// appends to *different* conversations never contend, and the per-entry
/// `RwLock` keeps a single conversation's message order consistent under
/// concurrent turns on the same id.
#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: DashMap<ConversationId, Arc<RwLock<Conversation>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self) -> ConversationId {
        let id = ConversationId::new();
        self.conversations
            .insert(id.clone(), Arc::new(RwLock::new(Conversation::new(id.clone()))));
        id
    }

    /// Total per §4.9: appending to an id the store hasn't seen yet creates
    /// an empty conversation for it first rather than failing.
    async fn append(&self, id: &ConversationId, message: Message) -> Result<(), StoreError> {
        let entry = self
            .conversations
            .entry(id.clone())
            .or_insert_with(|| Arc::new(RwLock::new(Conversation::new(id.clone()))))
            .clone();
        entry.write().messages.push(message);
        Ok(())
    }

    async fn get(&self, id: &ConversationId) -> Result<Conversation, StoreError> {
        let entry = self
            .conversations
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(entry.read().clone())
    }

    async fn clear(&self, id: &ConversationId) -> Result<(), StoreError> {
        if self.conversations.remove(id).is_none() {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn list(&self) -> Vec<ConversationId> {
        self.conversations.iter().map(|entry| entry.key().clone()).collect()
    }

    async fn count(&self, id: &ConversationId) -> Result<usize, StoreError> {
        let entry = self
            .conversations
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        Ok(entry.read().messages.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_get_clear_list_count_round_trip() {
        let store = InMemoryConversationStore::new();
        let id = store.create().await;
        assert_eq!(store.list().await.len(), 1);

        store.append(&id, Message::user(id.clone(), "hello")).await.unwrap();
        store.append(&id, Message::assistant(id.clone(), "hi", Vec::new())).await.unwrap();

        assert_eq!(store.count(&id).await.unwrap(), 2);
        let conversation = store.get(&id).await.unwrap();
        assert_eq!(conversation.messages.len(), 2);

        store.clear(&id).await.unwrap();
        assert!(store.get(&id).await.is_err());
    }

    #[tokio::test]
    async fn get_and_count_on_unknown_conversation_fail() {
        let store = InMemoryConversationStore::new();
        let bogus = ConversationId::new();
        assert!(store.get(&bogus).await.is_err());
        assert!(store.count(&bogus).await.is_err());
    }

    #[tokio::test]
    async fn append_is_total_and_creates_the_list_on_first_use() {
        let store = InMemoryConversationStore::new();
        let fresh = ConversationId::new();
        assert!(store.get(&fresh).await.is_err());

        store.append(&fresh, Message::user(fresh.clone(), "hi")).await.unwrap();

        let conversation = store.get(&fresh).await.unwrap();
        assert_eq!(conversation.messages.len(), 1);
    }
}
