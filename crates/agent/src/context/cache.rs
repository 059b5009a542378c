//! Per-conversation context cache with TTL-based staleness.
//!
//! A read-through cache in front of the `ConversationStore`. An entry
//! is valid only while `now - cached_at < ttl`; once expired it is
//! treated as absent and the next `get` re-reads the store. Callers
//! must `invalidate` after persisting any message so the next turn
//! never sees stale context.
//!
//! The map itself is guarded by one RwLock; there is no per-key lock.
//! Two concurrent read-throughs for the same conversation may both hit
//! the store, with the later write winning. Both observe consistent
//! snapshots, so the race costs a redundant read, nothing more.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use taskmind_core::error::StoreError;
use taskmind_core::message::{ConversationId, Message};
use taskmind_core::store::ConversationStore;
use tokio::sync::RwLock;
use tracing::debug;

struct CacheEntry {
    messages: Vec<Message>,
    cached_at: Instant,
}

/// A TTL cache of conversation histories.
pub struct ContextCache {
    store: Arc<dyn ConversationStore>,
    ttl: Duration,
    entries: RwLock<HashMap<ConversationId, CacheEntry>>,
}

impl ContextCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    pub fn new(store: Arc<dyn ConversationStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The conversation's history, from cache when fresh, otherwise
    /// read through from the store and re-cached with a new timestamp.
    pub async fn get(&self, id: &ConversationId) -> Result<Vec<Message>, StoreError> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(id) {
                if entry.cached_at.elapsed() < self.ttl {
                    debug!(conversation_id = %id, "Context cache hit");
                    return Ok(entry.messages.clone());
                }
            }
        }

        debug!(conversation_id = %id, "Context cache miss, reading store");
        let messages = self.store.load(id).await?;
        self.entries.write().await.insert(
            id.clone(),
            CacheEntry {
                messages: messages.clone(),
                cached_at: Instant::now(),
            },
        );
        Ok(messages)
    }

    /// Unconditionally overwrite the cache slot with a fresh timestamp.
    pub async fn put(&self, id: &ConversationId, messages: Vec<Message>) {
        self.entries.write().await.insert(
            id.clone(),
            CacheEntry {
                messages,
                cached_at: Instant::now(),
            },
        );
    }

    /// Drop the cache slot; the next `get` is forced to read the store.
    pub async fn invalidate(&self, id: &ConversationId) {
        if self.entries.write().await.remove(id).is_some() {
            debug!(conversation_id = %id, "Context cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// A conversation store that counts loads.
    struct CountingStore {
        messages: Vec<Message>,
        loads: AtomicU32,
    }

    impl CountingStore {
        fn new(messages: Vec<Message>) -> Self {
            Self {
                messages,
                loads: AtomicU32::new(0),
            }
        }

        fn load_count(&self) -> u32 {
            self.loads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConversationStore for CountingStore {
        async fn load(&self, _id: &ConversationId) -> Result<Vec<Message>, StoreError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.messages.clone())
        }

        async fn append(&self, _id: &ConversationId, _message: Message) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn history() -> Vec<Message> {
        vec![Message::user("add gym"), Message::assistant("Done!")]
    }

    #[tokio::test]
    async fn second_get_within_ttl_hits_cache() {
        let store = Arc::new(CountingStore::new(history()));
        let cache = ContextCache::new(store.clone(), Duration::from_secs(300));
        let id = ConversationId::from("c1");

        let first = cache.get(&id).await.unwrap();
        let second = cache.get(&id).await.unwrap();

        assert_eq!(store.load_count(), 1);
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].id, second[0].id);
        assert_eq!(first[0].content, second[0].content);
    }

    #[tokio::test]
    async fn expired_entry_forces_exactly_one_fresh_read() {
        let store = Arc::new(CountingStore::new(history()));
        let cache = ContextCache::new(store.clone(), Duration::from_millis(20));
        let id = ConversationId::from("c1");

        cache.get(&id).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.get(&id).await.unwrap();

        assert_eq!(store.load_count(), 2);

        // Re-cached with a fresh timestamp: no third read right away.
        cache.get(&id).await.unwrap();
        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_store_read_regardless_of_ttl() {
        let store = Arc::new(CountingStore::new(history()));
        let cache = ContextCache::new(store.clone(), Duration::from_secs(300));
        let id = ConversationId::from("c1");

        cache.get(&id).await.unwrap();
        cache.invalidate(&id).await;
        cache.get(&id).await.unwrap();

        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test]
    async fn invalidate_is_per_conversation() {
        let store = Arc::new(CountingStore::new(history()));
        let cache = ContextCache::new(store.clone(), Duration::from_secs(300));
        let a = ConversationId::from("a");
        let b = ConversationId::from("b");

        cache.get(&a).await.unwrap();
        cache.get(&b).await.unwrap();
        cache.invalidate(&a).await;
        cache.get(&b).await.unwrap();

        // Only the two initial reads; b stayed cached.
        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test]
    async fn put_overwrites_slot() {
        let store = Arc::new(CountingStore::new(history()));
        let cache = ContextCache::new(store.clone(), Duration::from_secs(300));
        let id = ConversationId::from("c1");

        cache.put(&id, vec![Message::user("cached directly")]).await;
        let messages = cache.get(&id).await.unwrap();

        assert_eq!(store.load_count(), 0);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "cached directly");
    }
}
