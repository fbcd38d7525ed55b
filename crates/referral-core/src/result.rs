//! Result type aliases for the referral cache.

use crate::ReferralError;

/// A specialized `Result` type for referral operations.
pub type ReferralResult<T> = Result<T, ReferralError>;
