//! Referral service trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use referral_core::{Interface, ReferralMapping, ReferralResult, UserId};

/// Referral service trait.
///
/// Callers pass an already authenticated owner id and an already generated
/// code; the service keeps the durable store and the cache in step.
#[async_trait]
pub trait ReferralService: Interface + Send + Sync {
    /// Creates a referral code for a user.
    async fn create_referral_code(
        &self,
        owner: UserId,
        code: &str,
        expiry: DateTime<Utc>,
    ) -> ReferralResult<ReferralMapping>;

    /// Deletes a user's referral code.
    async fn delete_referral_code(&self, owner: UserId) -> ReferralResult<()>;

    /// Gets the live referral code owned by the user with this email.
    async fn referral_code_for_email(&self, email: &str) -> ReferralResult<String>;

    /// Validates a referral code and returns its owner.
    async fn validate_referral_code(&self, code: &str) -> ReferralResult<UserId>;

    /// Lists the emails of users who registered with the referrer's code.
    async fn referred_emails(&self, referrer: UserId) -> ReferralResult<Vec<String>>;
}
