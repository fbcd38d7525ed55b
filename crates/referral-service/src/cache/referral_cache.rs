//! Referral cache manager.
//!
//! Keeps the cache store a correct, possibly incomplete, shadow of the
//! durable referral store. Two key namespaces are maintained:
//!
//! - `code:<code>` holds the owner's user id
//! - `email:<email>` holds the owner's referral code
//!
//! Both entries expire no later than the mapping itself.

use super::{cache_keys, CacheStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use referral_core::{Interface, ReferralError, ReferralMapping, ReferralResult, UserId};
use referral_repository::ReferralStore;
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Owner and expiry reconstructed from a cache hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedReferral {
    /// User who created the code.
    pub owner: UserId,
    /// Derived from the entry's remaining TTL.
    pub expiry: DateTime<Utc>,
}

/// Cache-aside operations for referral codes.
#[async_trait]
pub trait ReferralCache: Interface + Send + Sync {
    /// Writes the `code` and `email` entries for an already persisted mapping.
    ///
    /// An unassigned `owner` skips the code entry and an empty `email` skips
    /// the email entry. Partial population is not rolled back.
    async fn populate(
        &self,
        code: &str,
        owner: UserId,
        email: &str,
        expiry: DateTime<Utc>,
    ) -> ReferralResult<()>;

    /// Reads the owner of a code from the cache only.
    ///
    /// Returns `None` on a miss. Errors only on cache transport failures.
    async fn resolve_code_to_user(&self, code: &str) -> ReferralResult<Option<CachedReferral>>;

    /// Reads the code hinted for an email from the cache only.
    async fn resolve_email_to_code(&self, email: &str) -> ReferralResult<Option<String>>;

    /// Removes the `code` entry and its owner's `email` entry.
    ///
    /// The owner and email are looked up in the durable store when the cache
    /// cannot supply them. Deleting the durable mapping is left to the caller.
    async fn invalidate(&self, code: &str) -> ReferralResult<()>;

    /// Resolves a code to its live mapping, falling back to the durable store
    /// and warming the cache on a miss.
    async fn lookup_referrer(&self, code: &str) -> ReferralResult<ReferralMapping>;

    /// Resolves an email to its owner's live code, falling back to the
    /// durable store and warming the cache on a miss.
    async fn lookup_code_for_email(&self, email: &str) -> ReferralResult<String>;
}

/// Time left until `expiry`, floored to whole milliseconds.
fn ttl_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> ReferralResult<Duration> {
    let ms = (expiry - now).num_milliseconds();
    match u64::try_from(ms) {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ReferralError::InvalidTtl(format!(
            "expiry {expiry} is not in the future"
        ))),
    }
}

fn expiry_after(now: DateTime<Utc>, left: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(left)
        .ok()
        .and_then(|left| now.checked_add_signed(left))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Referral cache backed by an injected cache store and durable store.
#[derive(Component)]
#[shaku(interface = ReferralCache)]
pub struct ReferralCacheManager {
    #[shaku(inject)]
    cache: Arc<dyn CacheStore>,
    #[shaku(inject)]
    store: Arc<dyn ReferralStore>,
}

impl ReferralCacheManager {
    /// Creates a manager over the given stores.
    pub fn new(cache: Arc<dyn CacheStore>, store: Arc<dyn ReferralStore>) -> Self {
        Self { cache, store }
    }

    async fn warm(&self, mapping: &ReferralMapping, email: &str) {
        if let Err(e) = self
            .populate(&mapping.code, mapping.owner, email, mapping.expiry)
            .await
        {
            warn!("Failed to repopulate cache for referral '{}': {}", mapping.code, e);
        }
    }

    fn live(mapping: ReferralMapping) -> ReferralResult<ReferralMapping> {
        if mapping.is_expired() {
            return Err(ReferralError::ReferralExpired(mapping.code));
        }
        Ok(mapping)
    }
}

#[async_trait]
impl ReferralCache for ReferralCacheManager {
    async fn populate(
        &self,
        code: &str,
        owner: UserId,
        email: &str,
        expiry: DateTime<Utc>,
    ) -> ReferralResult<()> {
        let with_code = !owner.is_unassigned();
        let with_email = !email.is_empty();
        if !with_code && !with_email {
            debug!("Nothing to cache for referral '{}'", code);
            return Ok(());
        }
        if code.is_empty() {
            return Err(ReferralError::validation("referral code must not be empty"));
        }

        let ttl = ttl_until(expiry, Utc::now())?;

        if with_code {
            self.cache
                .set(&cache_keys::code(code), &owner.to_string(), ttl)
                .await?;
        }
        if with_email {
            if let Err(e) = self.cache.set(&cache_keys::email(email), code, ttl).await {
                if with_code {
                    warn!("Referral '{}' cached without its email entry: {}", code, e);
                }
                return Err(e);
            }
        }

        debug!("Cached referral '{}' for {:?}", code, ttl);
        Ok(())
    }

    async fn resolve_code_to_user(&self, code: &str) -> ReferralResult<Option<CachedReferral>> {
        let key = cache_keys::code(code);
        // Sampled before the reads so the derived expiry never overshoots.
        let now = Utc::now();

        let Some(raw) = self.cache.get(&key).await? else {
            debug!("Referral cache miss for code '{}'", code);
            return Ok(None);
        };

        let owner = match raw.parse::<UserId>() {
            Ok(owner) if !owner.is_unassigned() => owner,
            _ => {
                warn!("Ignoring malformed cached owner '{}' for code '{}'", raw, code);
                return Ok(None);
            }
        };

        // The entry may have expired between the two reads.
        let Some(left) = self.cache.remaining_ttl(&key).await? else {
            return Ok(None);
        };

        debug!("Referral cache hit for code '{}'", code);
        Ok(Some(CachedReferral {
            owner,
            expiry: expiry_after(now, left),
        }))
    }

    async fn resolve_email_to_code(&self, email: &str) -> ReferralResult<Option<String>> {
        match self.cache.get(&cache_keys::email(email)).await? {
            Some(code) if !code.is_empty() => {
                debug!("Referral cache hit for email '{}'", email);
                Ok(Some(code))
            }
            Some(_) => {
                warn!("Ignoring empty cached code for email '{}'", email);
                Ok(None)
            }
            None => {
                debug!("Referral cache miss for email '{}'", email);
                Ok(None)
            }
        }
    }

    async fn invalidate(&self, code: &str) -> ReferralResult<()> {
        let cached = match self.resolve_code_to_user(code).await {
            Ok(hit) => hit.map(|hit| hit.owner),
            Err(e) => {
                warn!("Cache read failed for code '{}', using durable store: {}", code, e);
                None
            }
        };
        let owner = match cached {
            Some(owner) => owner,
            None => {
                self.store
                    .find_by_code(code)
                    .await?
                    .ok_or_else(|| ReferralError::referral_not_found(code))?
                    .owner
            }
        };

        let email = self
            .store
            .find_user_email(owner)
            .await?
            .ok_or_else(|| ReferralError::user_not_found(owner))?;

        let code_deleted = self.cache.delete(&cache_keys::code(code)).await;
        let email_deleted = self.cache.delete(&cache_keys::email(&email)).await;

        debug!(
            "Invalidated referral '{}' (code entry: {:?}, email entry: {:?})",
            code, code_deleted, email_deleted
        );
        code_deleted?;
        email_deleted?;
        Ok(())
    }

    async fn lookup_referrer(&self, code: &str) -> ReferralResult<ReferralMapping> {
        match self.resolve_code_to_user(code).await {
            Ok(Some(hit)) => return Ok(ReferralMapping::new(code, hit.owner, hit.expiry)),
            Ok(None) => {}
            Err(e) => warn!("Cache read failed for code '{}', using durable store: {}", code, e),
        }

        let mapping = self
            .store
            .find_by_code(code)
            .await?
            .ok_or_else(|| ReferralError::referral_not_found(code))?;
        let mapping = Self::live(mapping)?;

        self.warm(&mapping, "").await;
        Ok(mapping)
    }

    async fn lookup_code_for_email(&self, email: &str) -> ReferralResult<String> {
        match self.resolve_email_to_code(email).await {
            Ok(Some(code)) => return Ok(code),
            Ok(None) => {}
            Err(e) => warn!("Cache read failed for email '{}', using durable store: {}", email, e),
        }

        let owner = self
            .store
            .find_user_id_by_email(email)
            .await?
            .ok_or_else(|| ReferralError::user_not_found(email))?;
        let mapping = self
            .store
            .find_by_owner(owner)
            .await?
            .ok_or_else(|| ReferralError::referral_not_found(format!("owner {owner}")))?;
        let mapping = Self::live(mapping)?;

        self.warm(&mapping, email).await;
        Ok(mapping.code)
    }
}
