//! Durable store trait definitions.

use async_trait::async_trait;
use referral_core::{Interface, ReferralMapping, ReferralResult, UserId};

/// Authoritative store for referral mappings and the user records they
/// point at.
///
/// Absent rows are reported as `Ok(None)` (or an empty list), never as an
/// error, so callers can tell "no such mapping" apart from "store
/// unavailable". Rows are never expired implicitly.
#[async_trait]
pub trait ReferralStore: Interface + Send + Sync {
    /// Finds the mapping for a referral code.
    async fn find_by_code(&self, code: &str) -> ReferralResult<Option<ReferralMapping>>;

    /// Finds the mapping created by a user.
    async fn find_by_owner(&self, owner: UserId) -> ReferralResult<Option<ReferralMapping>>;

    /// Finds a user's email address.
    async fn find_user_email(&self, user_id: UserId) -> ReferralResult<Option<String>>;

    /// Finds a user id by email, ignoring case.
    async fn find_user_id_by_email(&self, email: &str) -> ReferralResult<Option<UserId>>;

    /// Persists a new mapping.
    ///
    /// Fails with `Conflict` if the owner already has a code or the code is
    /// taken.
    async fn save(&self, mapping: &ReferralMapping) -> ReferralResult<ReferralMapping>;

    /// Deletes the mapping created by a user. Returns `true` if a row was removed.
    async fn delete_by_owner(&self, owner: UserId) -> ReferralResult<bool>;

    /// Lists the emails of users who registered with the referrer's code.
    async fn find_referred_emails(&self, referrer: UserId) -> ReferralResult<Vec<String>>;
}
