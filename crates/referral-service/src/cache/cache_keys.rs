//! Cache key generators for consistent key naming.
//!
//! Codes and emails live in disjoint namespaces so an email string can never
//! collide with a referral code.

/// Namespace for `code -> owner user id` entries.
const CODE_NAMESPACE: &str = "code";

/// Namespace for `email -> code` entries.
const EMAIL_NAMESPACE: &str = "email";

/// Generate the cache key holding the owner of a referral code.
#[must_use]
pub fn code(code: &str) -> String {
    format!("{CODE_NAMESPACE}:{code}")
}

/// Generate the cache key holding the referral code of an email.
#[must_use]
pub fn email(email: &str) -> String {
    format!("{EMAIL_NAMESPACE}:{}", email.to_lowercase())
}
