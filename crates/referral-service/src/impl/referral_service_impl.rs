//! Referral service implementation.

use crate::cache::ReferralCache;
use crate::referral_service::ReferralService;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use referral_core::{ReferralError, ReferralMapping, ReferralResult, UserId};
use referral_repository::ReferralStore;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Concrete referral service component for Shaku DI.
///
/// Writes and deletes go to the durable store, then to the cache. Reads go
/// through the referral cache.
#[derive(Component)]
#[shaku(interface = ReferralService)]
pub struct ReferralServiceComponent {
    #[shaku(inject)]
    referral_cache: Arc<dyn ReferralCache>,
    #[shaku(inject)]
    store: Arc<dyn ReferralStore>,
}

impl ReferralServiceComponent {
    /// Creates a new referral service.
    pub fn new(referral_cache: Arc<dyn ReferralCache>, store: Arc<dyn ReferralStore>) -> Self {
        Self {
            referral_cache,
            store,
        }
    }
}

impl std::fmt::Debug for ReferralServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferralServiceComponent").finish_non_exhaustive()
    }
}

fn validate_new_code(owner: UserId, code: &str, expiry: DateTime<Utc>) -> ReferralResult<()> {
    if owner.is_unassigned() {
        return Err(ReferralError::validation(format!("invalid owner id {owner}")));
    }
    if code.trim().is_empty() {
        return Err(ReferralError::validation("referral code must not be empty"));
    }
    if expiry <= Utc::now() {
        return Err(ReferralError::validation("expiry must be in the future"));
    }
    Ok(())
}

#[async_trait]
impl ReferralService for ReferralServiceComponent {
    async fn create_referral_code(
        &self,
        owner: UserId,
        code: &str,
        expiry: DateTime<Utc>,
    ) -> ReferralResult<ReferralMapping> {
        debug!("Creating referral code for user: {}", owner);

        validate_new_code(owner, code, expiry)?;

        if self.store.find_by_owner(owner).await?.is_some() {
            return Err(ReferralError::conflict(format!(
                "User {owner} already has a referral code"
            )));
        }

        let saved = self
            .store
            .save(&ReferralMapping::new(code, owner, expiry))
            .await?;

        if let Err(e) = self
            .referral_cache
            .populate(&saved.code, saved.owner, "", saved.expiry)
            .await
        {
            warn!("Referral '{}' created but not cached: {}", saved.code, e);
        }

        info!("Referral code created for user: {}", owner);
        Ok(saved)
    }

    async fn delete_referral_code(&self, owner: UserId) -> ReferralResult<()> {
        debug!("Deleting referral code of user: {}", owner);

        let mapping = self
            .store
            .find_by_owner(owner)
            .await?
            .ok_or_else(|| ReferralError::referral_not_found(format!("owner {owner}")))?;

        match self.referral_cache.invalidate(&mapping.code).await {
            Ok(()) => {}
            Err(ReferralError::CacheUnavailable(e)) => {
                warn!(
                    "Cache entries for referral '{}' left until expiry: {}",
                    mapping.code, e
                );
            }
            Err(e) => return Err(e),
        }

        if !self.store.delete_by_owner(owner).await? {
            return Err(ReferralError::referral_not_found(format!("owner {owner}")));
        }

        info!("Referral code deleted for user: {}", owner);
        Ok(())
    }

    async fn referral_code_for_email(&self, email: &str) -> ReferralResult<String> {
        debug!("Getting referral code by email: {}", email);

        if email.trim().is_empty() {
            return Err(ReferralError::validation("email must not be empty"));
        }
        self.referral_cache.lookup_code_for_email(email).await
    }

    async fn validate_referral_code(&self, code: &str) -> ReferralResult<UserId> {
        debug!("Validating referral code: {}", code);

        if code.trim().is_empty() {
            return Err(ReferralError::validation("referral code must not be empty"));
        }
        Ok(self.referral_cache.lookup_referrer(code).await?.owner)
    }

    async fn referred_emails(&self, referrer: UserId) -> ReferralResult<Vec<String>> {
        debug!("Listing users referred by: {}", referrer);
        self.store.find_referred_emails(referrer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, InMemoryCacheStore, ReferralCacheManager};
    use chrono::Duration;
    use referral_repository::InMemoryReferralStore;

    struct Fixture {
        cache: Arc<InMemoryCacheStore>,
        store: Arc<InMemoryReferralStore>,
        manager: Arc<ReferralCacheManager>,
        service: ReferralServiceComponent,
    }

    fn fixture() -> Fixture {
        let cache = Arc::new(InMemoryCacheStore::new());
        let store = Arc::new(InMemoryReferralStore::new());
        let manager = Arc::new(ReferralCacheManager::new(cache.clone(), store.clone()));
        let service = ReferralServiceComponent::new(manager.clone(), store.clone());
        Fixture {
            cache,
            store,
            manager,
            service,
        }
    }

    fn tomorrow() -> DateTime<Utc> {
        Utc::now() + Duration::days(1)
    }

    #[tokio::test]
    async fn test_create_referral_code_persists_and_caches() {
        let f = fixture();
        let created = f
            .service
            .create_referral_code(UserId::new(1), "ABC123", tomorrow())
            .await
            .unwrap();

        assert_eq!(created.code, "ABC123");
        assert!(f.store.find_by_code("ABC123").await.unwrap().is_some());

        let hit = f.manager.resolve_code_to_user("ABC123").await.unwrap().unwrap();
        assert_eq!(hit.owner, UserId::new(1));
    }

    #[tokio::test]
    async fn test_create_referral_code_twice_conflicts() {
        let f = fixture();
        f.service
            .create_referral_code(UserId::new(1), "ABC123", tomorrow())
            .await
            .unwrap();

        let err = f
            .service
            .create_referral_code(UserId::new(1), "DEF456", tomorrow())
            .await
            .unwrap_err();
        assert!(matches!(err, ReferralError::Conflict(_)));
        assert!(f.manager.resolve_code_to_user("DEF456").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_referral_code_taken_code_conflicts() {
        let f = fixture();
        f.service
            .create_referral_code(UserId::new(1), "ABC123", tomorrow())
            .await
            .unwrap();

        let err = f
            .service
            .create_referral_code(UserId::new(2), "ABC123", tomorrow())
            .await
            .unwrap_err();
        assert!(matches!(err, ReferralError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_referral_code_validation() {
        let f = fixture();
        let cases = [
            (UserId::UNASSIGNED, "ABC123", tomorrow()),
            (UserId::new(1), "  ", tomorrow()),
            (UserId::new(1), "ABC123", Utc::now() - Duration::seconds(1)),
        ];

        for (owner, code, expiry) in cases {
            let err = f
                .service
                .create_referral_code(owner, code, expiry)
                .await
                .unwrap_err();
            assert!(matches!(err, ReferralError::Validation(_)));
        }
        assert!(f.cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_referral_code_clears_cache_and_store() {
        let f = fixture();
        f.store.insert_user(UserId::new(1), "owner@example.com", None).await;
        f.service
            .create_referral_code(UserId::new(1), "ABC123", tomorrow())
            .await
            .unwrap();
        assert_eq!(
            f.service.referral_code_for_email("owner@example.com").await.unwrap(),
            "ABC123"
        );

        f.service.delete_referral_code(UserId::new(1)).await.unwrap();

        assert!(f.store.find_by_owner(UserId::new(1)).await.unwrap().is_none());
        assert!(f.cache.is_empty().await);
        let err = f.service.validate_referral_code("ABC123").await.unwrap_err();
        assert!(matches!(err, ReferralError::ReferralNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_referral_code() {
        let f = fixture();
        let err = f.service.delete_referral_code(UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, ReferralError::ReferralNotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_referral_code_with_dangling_owner_keeps_record() {
        let f = fixture();
        f.service
            .create_referral_code(UserId::new(1), "ABC123", tomorrow())
            .await
            .unwrap();

        // No user row for the owner: invalidation cannot find the email.
        let err = f.service.delete_referral_code(UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, ReferralError::UserNotFound(_)));
        assert!(f.store.find_by_owner(UserId::new(1)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_validate_referral_code() {
        let f = fixture();
        f.store
            .save(&ReferralMapping::new("ABC123", UserId::new(3), tomorrow()))
            .await
            .unwrap();

        assert_eq!(
            f.service.validate_referral_code("ABC123").await.unwrap(),
            UserId::new(3)
        );
        // Served from the cache after the first read-through.
        assert!(f.cache.get("code:ABC123").await.unwrap().is_some());

        let err = f.service.validate_referral_code("").await.unwrap_err();
        assert!(matches!(err, ReferralError::Validation(_)));
    }

    #[tokio::test]
    async fn test_expired_referral_code_is_rejected() {
        let f = fixture();
        f.store
            .save(&ReferralMapping::new(
                "OLD",
                UserId::new(3),
                Utc::now() - Duration::hours(1),
            ))
            .await
            .unwrap();

        let err = f.service.validate_referral_code("OLD").await.unwrap_err();
        assert!(matches!(err, ReferralError::ReferralExpired(_)));
    }

    #[tokio::test]
    async fn test_referral_code_for_unknown_email() {
        let f = fixture();
        let err = f
            .service
            .referral_code_for_email("nobody@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ReferralError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_referred_emails() {
        let f = fixture();
        let referrer = UserId::new(1);
        f.store.insert_user(referrer, "owner@example.com", None).await;
        f.store.insert_user(UserId::new(2), "friend@example.com", Some(referrer)).await;

        assert_eq!(
            f.service.referred_emails(referrer).await.unwrap(),
            vec!["friend@example.com"]
        );
        assert!(f.service.referred_emails(UserId::new(2)).await.unwrap().is_empty());
    }
}
