//! Referral mapping entity.

use crate::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authoritative record tying a referral code to the user who created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralMapping {
    /// Unique, non-empty referral code.
    pub code: String,
    /// Creator of the code.
    pub owner: UserId,
    /// Instant after which the code no longer admits new registrations.
    pub expiry: DateTime<Utc>,
}

impl ReferralMapping {
    /// Creates a new referral mapping.
    #[must_use]
    pub fn new(code: impl Into<String>, owner: UserId, expiry: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            owner,
            expiry,
        }
    }

    /// Returns `true` if the mapping has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now
    }

    /// Returns `true` if the mapping has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
