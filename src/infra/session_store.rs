//! Session store backends.
//!
//! A session store is a plain keyed map from handle to [`SessionRecord`].
//! Expiry decisions belong to the session manager, which owns the clock;
//! backends only honour the TTL hint (Redis) or purge on request (memory).

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::cache::Cache;
use crate::domain::{SessionHandle, SessionRecord};
use crate::errors::AppResult;

/// Keyed storage for session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, handle: &SessionHandle) -> AppResult<Option<SessionRecord>>;

    /// Insert or replace the record; `ttl` is how long the backend should
    /// keep it at most.
    async fn save(&self, handle: &SessionHandle, record: &SessionRecord, ttl: Duration)
        -> AppResult<()>;

    async fn delete(&self, handle: &SessionHandle) -> AppResult<()>;

    /// Drop records that expired before `now`. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<usize>;

    /// Check the backend is reachable.
    async fn ping(&self) -> AppResult<()>;
}

/// Process-local session store.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, live or not.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, handle: &SessionHandle) -> AppResult<Option<SessionRecord>> {
        Ok(self.sessions.read().await.get(handle.as_str()).cloned())
    }

    async fn save(
        &self,
        handle: &SessionHandle,
        record: &SessionRecord,
        _ttl: Duration,
    ) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .insert(handle.as_str().to_string(), record.clone());
        Ok(())
    }

    async fn delete(&self, handle: &SessionHandle) -> AppResult<()> {
        self.sessions.write().await.remove(handle.as_str());
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| !record.is_expired(now));
        Ok(before - sessions.len())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Redis-backed session store; Redis expires keys on its own.
#[derive(Clone)]
pub struct RedisSessionStore {
    cache: Cache,
}

impl RedisSessionStore {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, handle: &SessionHandle) -> AppResult<Option<SessionRecord>> {
        self.cache.get_session(handle.as_str()).await
    }

    async fn save(
        &self,
        handle: &SessionHandle,
        record: &SessionRecord,
        ttl: Duration,
    ) -> AppResult<()> {
        let ttl_seconds = ttl.num_seconds().max(1) as u64;
        self.cache
            .set_session(handle.as_str(), record, ttl_seconds)
            .await
    }

    async fn delete(&self, handle: &SessionHandle) -> AppResult<()> {
        self.cache.delete_session(handle.as_str()).await
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> AppResult<usize> {
        Ok(0)
    }

    async fn ping(&self) -> AppResult<()> {
        self.cache.ping().await
    }
}
