//! Unified error type for all layers of the referral cache.

use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for the referral cache.
///
/// Absent data that an operation merely looks up is reported as `None` by the
/// stores and the manager; the `*NotFound` variants are raised only when an
/// operation cannot proceed without the data.
#[derive(Error, Debug)]
pub enum ReferralError {
    // ============ Domain Errors ============
    /// No referral mapping exists for the given code or owner.
    #[error("Referral not found: {0}")]
    ReferralNotFound(String),

    /// No user record exists for the given id or email.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The referral mapping exists but its expiry has passed.
    #[error("Referral expired: {0}")]
    ReferralExpired(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict error (e.g., duplicate entry)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A non-positive time-to-live was requested.
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    // ============ Infrastructure Errors ============
    /// The cache store could not be reached or rejected the command.
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    /// Durable store error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReferralError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ReferralNotFound(_) => "REFERRAL_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::ReferralExpired(_) => "REFERRAL_EXPIRED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidTtl(_) => "INVALID_TTL",
            Self::CacheUnavailable(_) => "CACHE_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a referral-not-found error.
    #[must_use]
    pub fn referral_not_found<T: ToString>(key: T) -> Self {
        Self::ReferralNotFound(key.to_string())
    }

    /// Creates a user-not-found error.
    #[must_use]
    pub fn user_not_found<T: ToString>(key: T) -> Self {
        Self::UserNotFound(key.to_string())
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a cache-unavailable error.
    #[must_use]
    pub fn cache_unavailable<T: Into<String>>(message: T) -> Self {
        Self::CacheUnavailable(message.into())
    }

    /// Checks if this error is a transport failure a caller may retry.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::CacheUnavailable(_))
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for ReferralError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // PostgreSQL unique violation
            if db_err.code().as_deref() == Some("23505") {
                return Self::Conflict(db_err.message().to_string());
            }
        }
        Self::Database(err.to_string())
    }
}
