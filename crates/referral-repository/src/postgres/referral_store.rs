//! PostgreSQL referral store implementation.

use crate::{traits::ReferralStore, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use referral_core::{ReferralMapping, ReferralResult, UserId};
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// PostgreSQL referral store implementation.
#[derive(Component, Clone)]
#[shaku(interface = ReferralStore)]
pub struct PgReferralStore {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl PgReferralStore {
    /// Creates a new PostgreSQL referral store.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a referral.
#[derive(Debug, FromRow)]
struct ReferralRow {
    code: String,
    user_id: i64,
    expiry: DateTime<Utc>,
}

impl From<ReferralRow> for ReferralMapping {
    fn from(row: ReferralRow) -> Self {
        ReferralMapping::new(row.code, UserId::new(row.user_id), row.expiry)
    }
}

#[async_trait]
impl ReferralStore for PgReferralStore {
    async fn find_by_code(&self, code: &str) -> ReferralResult<Option<ReferralMapping>> {
        debug!("Finding referral by code: {}", code);

        let row = sqlx::query_as::<_, ReferralRow>(
            "SELECT code, user_id, expiry FROM referrals WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(ReferralMapping::from))
    }

    async fn find_by_owner(&self, owner: UserId) -> ReferralResult<Option<ReferralMapping>> {
        debug!("Finding referral by owner: {}", owner);

        let row = sqlx::query_as::<_, ReferralRow>(
            "SELECT code, user_id, expiry FROM referrals WHERE user_id = $1",
        )
        .bind(owner.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(ReferralMapping::from))
    }

    async fn find_user_email(&self, user_id: UserId) -> ReferralResult<Option<String>> {
        debug!("Finding email for user: {}", user_id);

        let email: Option<String> = sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
            .bind(user_id.into_inner())
            .fetch_optional(self.pool.inner())
            .await?;

        Ok(email)
    }

    async fn find_user_id_by_email(&self, email: &str) -> ReferralResult<Option<UserId>> {
        debug!("Finding user by email: {}", email);

        let id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(self.pool.inner())
                .await?;

        Ok(id.map(UserId::new))
    }

    async fn save(&self, mapping: &ReferralMapping) -> ReferralResult<ReferralMapping> {
        debug!("Saving referral {} for owner {}", mapping.code, mapping.owner);

        let row = sqlx::query_as::<_, ReferralRow>(
            r#"
            INSERT INTO referrals (user_id, code, expiry)
            VALUES ($1, $2, $3)
            RETURNING code, user_id, expiry
            "#,
        )
        .bind(mapping.owner.into_inner())
        .bind(&mapping.code)
        .bind(mapping.expiry)
        .fetch_one(self.pool.inner())
        .await?;

        Ok(row.into())
    }

    async fn delete_by_owner(&self, owner: UserId) -> ReferralResult<bool> {
        debug!("Deleting referral for owner: {}", owner);

        let result = sqlx::query("DELETE FROM referrals WHERE user_id = $1")
            .bind(owner.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_referred_emails(&self, referrer: UserId) -> ReferralResult<Vec<String>> {
        debug!("Finding users referred by: {}", referrer);

        let emails: Vec<String> = sqlx::query_scalar(
            "SELECT email FROM users WHERE referrer_id = $1 ORDER BY id",
        )
        .bind(referrer.into_inner())
        .fetch_all(self.pool.inner())
        .await?;

        Ok(emails)
    }
}

impl std::fmt::Debug for PgReferralStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgReferralStore").finish_non_exhaustive()
    }
}
