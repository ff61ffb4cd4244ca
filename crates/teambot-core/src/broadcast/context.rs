use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use async_trait::async_trait;

use tokio::sync::Mutex;

use crate::domain::{ActorId, ChatId};

use super::scope::BroadcastScope;

/// Ephemeral per-conversation data, populated at flow entry.
#[derive(Clone, Debug)]
pub struct BroadcastContext {
    pub scope: BroadcastScope,
    /// Who opened the flow; re-validated at confirmation.
    pub initiator_id: ActorId,
    pub initiator_label: String,
    /// Computed at entry for display; may drift from the send-time count.
    pub recipient_estimate: usize,
    pub draft_text: Option<String>,
}

/// Conversation position. `Idle` is the absence of a stored conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationState {
    AwaitingText,
    AwaitingConfirmation,
}

#[derive(Clone, Debug)]
pub struct Conversation {
    pub state: ConversationState,
    pub ctx: BroadcastContext,
}

/// Scoped key-value storage for one chat's broadcast conversation.
///
/// Keyed by the chat the conversation runs in; the initiator re-check at
/// confirmation guards shared admin chats. Lifetime is bounded: entries
/// expire after the configured TTL.
#[async_trait]
pub trait ContextStore: Send + Sync {
    async fn get(&self, chat: ChatId) -> Option<Conversation>;
    async fn put(&self, chat: ChatId, conv: Conversation);
    async fn clear(&self, chat: ChatId);
}

#[derive(Debug)]
struct Entry {
    conv: Conversation,
    touched: Instant,
}

/// In-process context store with TTL eviction on read.
pub struct InMemoryContextStore {
    ttl: Duration,
    inner: Mutex<HashMap<ChatId, Entry>>,
}

impl InMemoryContextStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    async fn get_at(&self, chat: ChatId, now: Instant) -> Option<Conversation> {
        let mut map = self.inner.lock().await;
        let entry = map.get(&chat)?;
        if now.duration_since(entry.touched) >= self.ttl {
            map.remove(&chat);
            return None;
        }
        Some(entry.conv.clone())
    }

    async fn put_at(&self, chat: ChatId, conv: Conversation, now: Instant) {
        let mut map = self.inner.lock().await;
        map.insert(chat, Entry { conv, touched: now });
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    async fn get(&self, chat: ChatId) -> Option<Conversation> {
        self.get_at(chat, Instant::now()).await
    }

    async fn put(&self, chat: ChatId, conv: Conversation) {
        self.put_at(chat, conv, Instant::now()).await;
    }

    async fn clear(&self, chat: ChatId) {
        self.inner.lock().await.remove(&chat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conv() -> Conversation {
        Conversation {
            state: ConversationState::AwaitingText,
            ctx: BroadcastContext {
                scope: BroadcastScope::Global,
                initiator_id: ActorId(1),
                initiator_label: "Root".to_string(),
                recipient_estimate: 3,
                draft_text: None,
            },
        }
    }

    #[tokio::test]
    async fn put_get_clear_roundtrip() {
        let store = InMemoryContextStore::new(Duration::from_secs(60));
        let chat = ChatId(5);

        assert!(store.get(chat).await.is_none());
        store.put(chat, conv()).await;
        assert!(store.get(chat).await.is_some());
        store.clear(chat).await;
        assert!(store.get(chat).await.is_none());
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let store = InMemoryContextStore::new(Duration::from_secs(60));
        let chat = ChatId(5);
        let start = Instant::now();

        store.put_at(chat, conv(), start).await;
        assert!(store
            .get_at(chat, start + Duration::from_secs(59))
            .await
            .is_some());
        assert!(store
            .get_at(chat, start + Duration::from_secs(60))
            .await
            .is_none());

        // Eviction is permanent, not just filtered on that read.
        assert!(store.get_at(chat, start).await.is_none());
    }

    #[tokio::test]
    async fn put_refreshes_the_ttl() {
        let store = InMemoryContextStore::new(Duration::from_secs(60));
        let chat = ChatId(5);
        let start = Instant::now();

        store.put_at(chat, conv(), start).await;
        store
            .put_at(chat, conv(), start + Duration::from_secs(50))
            .await;
        assert!(store
            .get_at(chat, start + Duration::from_secs(100))
            .await
            .is_some());
    }
}
