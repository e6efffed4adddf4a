use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use crate::{config::DEFAULT_SESSION_TTL_SECS, error::Result, types::SessionData};

/// Server-side session storage keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<SessionData>>;

    async fn set(&self, id: &str, data: SessionData) -> Result<()>;

    async fn clear(&self, id: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
struct Entry {
    data: SessionData,
    touched_at: DateTime<Utc>,
}

/// In-process store; sessions die with the process.
///
/// Entries expire `ttl` after they were last read or written. Expired entries
/// read as absent and are dropped on the next write.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    sessions: Arc<Mutex<HashMap<String, Entry>>>,
    ttl: TimeDelta,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_SESSION_TTL_SECS))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        MemoryStore {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Number of stored entries, expired ones not yet pruned included.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    fn is_expired(&self, entry: &Entry, now: DateTime<Utc>) -> bool {
        now - entry.touched_at >= self.ttl
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<SessionData>> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;

        let expired = match sessions.get(id) {
            Some(entry) => self.is_expired(entry, now),
            None => return Ok(None),
        };
        if expired {
            sessions.remove(id);
            return Ok(None);
        }

        Ok(sessions.get_mut(id).map(|entry| {
            entry.touched_at = now;
            entry.data.clone()
        }))
    }

    async fn set(&self, id: &str, data: SessionData) -> Result<()> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;

        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        if sessions.len() < before {
            tracing::debug!("Pruned {} expired sessions", before - sessions.len());
        }

        sessions.insert(
            id.to_string(),
            Entry {
                data,
                touched_at: now,
            },
        );
        Ok(())
    }

    async fn clear(&self, id: &str) -> Result<()> {
        self.sessions.lock().await.remove(id);
        Ok(())
    }
}
