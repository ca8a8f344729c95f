//! Session scoped key value storage. Values are opaque strings keyed
//! by session ID and then by name, so callers own their encoding.
use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

#[async_trait]
pub trait SessionStore {
    async fn load(&self, session_id: &str, key: &str) -> Result<Option<String>>;
    async fn save(&self, session_id: &str, key: &str, value: String) -> Result<()>;
    async fn remove(&self, session_id: &str, key: &str) -> Result<()>;
}

struct SessionEntry {
    values: HashMap<String, String>,
    last_access: DateTime<Utc>,
}

impl SessionEntry {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            values: HashMap::new(),
            last_access: now,
        }
    }
}

/// In-process session storage. Sessions that sit idle for longer
/// than `idle_timeout` are dropped the next time the store is
/// touched.
pub struct MemorySessionStore {
    idle_timeout: Duration,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl MemorySessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn is_expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        now - entry.last_access > self.idle_timeout
    }

    fn purge_expired(&self, sessions: &mut HashMap<String, SessionEntry>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!("Expired {} idle session(s)", purged);
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str, key: &str) -> Result<Option<String>> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        self.purge_expired(&mut sessions, now);

        let value = sessions.get_mut(session_id).and_then(|entry| {
            entry.last_access = now;
            entry.values.get(key).cloned()
        });
        Ok(value)
    }

    async fn save(&self, session_id: &str, key: &str, value: String) -> Result<()> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        self.purge_expired(&mut sessions, now);

        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionEntry::new(now));
        entry.last_access = now;
        entry.values.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, session_id: &str, key: &str) -> Result<()> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        self.purge_expired(&mut sessions, now);

        if let Some(entry) = sessions.get_mut(session_id) {
            entry.last_access = now;
            entry.values.remove(key);
        }
        Ok(())
    }
}
