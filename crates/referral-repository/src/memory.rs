//! In-memory referral store.
//!
//! Mirrors the uniqueness rules of the PostgreSQL schema so tests and local
//! runs without a database observe the same `Conflict` behavior.

use crate::traits::ReferralStore;
use async_trait::async_trait;
use referral_core::{ReferralError, ReferralMapping, ReferralResult, UserId};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct UserRecord {
    email: String,
    referrer: Option<UserId>,
}

/// Referral store backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryReferralStore {
    users: RwLock<BTreeMap<UserId, UserRecord>>,
    referrals: RwLock<BTreeMap<UserId, ReferralMapping>>,
}

impl InMemoryReferralStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user record.
    pub async fn insert_user(&self, id: UserId, email: impl Into<String>, referrer: Option<UserId>) {
        self.users.write().await.insert(
            id,
            UserRecord {
                email: email.into(),
                referrer,
            },
        );
    }
}

#[async_trait]
impl ReferralStore for InMemoryReferralStore {
    async fn find_by_code(&self, code: &str) -> ReferralResult<Option<ReferralMapping>> {
        Ok(self
            .referrals
            .read()
            .await
            .values()
            .find(|m| m.code == code)
            .cloned())
    }

    async fn find_by_owner(&self, owner: UserId) -> ReferralResult<Option<ReferralMapping>> {
        Ok(self.referrals.read().await.get(&owner).cloned())
    }

    async fn find_user_email(&self, user_id: UserId) -> ReferralResult<Option<String>> {
        Ok(self.users.read().await.get(&user_id).map(|u| u.email.clone()))
    }

    async fn find_user_id_by_email(&self, email: &str) -> ReferralResult<Option<UserId>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|(_, u)| u.email.eq_ignore_ascii_case(email))
            .map(|(id, _)| *id))
    }

    async fn save(&self, mapping: &ReferralMapping) -> ReferralResult<ReferralMapping> {
        let mut referrals = self.referrals.write().await;
        if referrals.contains_key(&mapping.owner) {
            return Err(ReferralError::conflict(format!(
                "user {} already has a referral code",
                mapping.owner
            )));
        }
        if referrals.values().any(|m| m.code == mapping.code) {
            return Err(ReferralError::conflict(format!(
                "referral code '{}' is taken",
                mapping.code
            )));
        }
        referrals.insert(mapping.owner, mapping.clone());
        Ok(mapping.clone())
    }

    async fn delete_by_owner(&self, owner: UserId) -> ReferralResult<bool> {
        Ok(self.referrals.write().await.remove(&owner).is_some())
    }

    async fn find_referred_emails(&self, referrer: UserId) -> ReferralResult<Vec<String>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.referrer == Some(referrer))
            .map(|u| u.email.clone())
            .collect())
    }
}
