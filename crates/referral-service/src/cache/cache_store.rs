//! Cache store trait for volatile key-value storage.

use async_trait::async_trait;
use referral_core::{Interface, ReferralError, ReferralResult};
use std::time::Duration;

/// Volatile key-value store with per-entry expiry.
///
/// Entries may vanish at any time once their TTL elapses. A missing key is a
/// normal outcome reported as `None` or `false`; only transport failures are
/// errors, and they surface as [`ReferralError::CacheUnavailable`].
#[async_trait]
pub trait CacheStore: Interface + Send + Sync {
    /// Stores `value` under `key`, expiring after `ttl`.
    ///
    /// Fails with [`ReferralError::InvalidTtl`] when `ttl` is shorter than one
    /// millisecond; nothing is stored in that case.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> ReferralResult<()>;

    /// Returns the value under `key`, or `None` on a miss.
    async fn get(&self, key: &str) -> ReferralResult<Option<String>>;

    /// Returns the time left before `key` expires.
    ///
    /// `None` if the key is absent or carries no expiry.
    async fn remaining_ttl(&self, key: &str) -> ReferralResult<Option<Duration>>;

    /// Deletes `key`. Returns `true` if the key existed.
    async fn delete(&self, key: &str) -> ReferralResult<bool>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;
}

/// Rejects TTLs that would round down to zero milliseconds.
pub fn validate_ttl(ttl: Duration) -> ReferralResult<()> {
    if ttl.as_millis() == 0 {
        return Err(ReferralError::InvalidTtl(format!(
            "ttl must be at least 1ms, got {ttl:?}"
        )));
    }
    Ok(())
}
