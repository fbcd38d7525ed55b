//! In-memory cache store.

use super::{validate_ttl, CacheStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use referral_core::ReferralResult;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Entry {
    /// Remaining lifetime floored to whole milliseconds, `None` once elapsed.
    fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let ms = (self.expires_at - now).num_milliseconds();
        u64::try_from(ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// Cache store kept in process memory.
///
/// Expired entries are dropped lazily on access. TTLs follow the same
/// millisecond resolution as Redis `PTTL`.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCacheStore {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.remaining(now).is_some())
            .count()
    }

    /// Returns `true` if no live entry is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn live_entry(&self, key: &str) -> Option<(Entry, Duration)> {
        let now = Utc::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) => {
                    if let Some(left) = entry.remaining(now) {
                        return Some((entry.clone(), left));
                    }
                }
            }
        }
        self.entries.write().await.remove(key);
        None
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> ReferralResult<()> {
        validate_ttl(ttl)?;
        let ttl = chrono::Duration::milliseconds(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX));
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> ReferralResult<Option<String>> {
        Ok(self.live_entry(key).await.map(|(entry, _)| entry.value))
    }

    async fn remaining_ttl(&self, key: &str) -> ReferralResult<Option<Duration>> {
        Ok(self.live_entry(key).await.map(|(_, left)| left))
    }

    async fn delete(&self, key: &str) -> ReferralResult<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }
}
