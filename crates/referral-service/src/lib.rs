//! # Referral Service
//!
//! Cache-aside consistency layer for referral codes.
//!
//! [`ReferralCacheManager`] keeps a volatile [`CacheStore`] an
//! accurate, possibly incomplete, shadow of the durable
//! [`ReferralStore`](referral_repository::ReferralStore).
//! [`ReferralService`] builds the create, delete and lookup flows on top of it.

pub mod cache;
pub mod r#impl;
pub mod referral_service;

pub use cache::*;
pub use r#impl::ReferralServiceComponent;
pub use referral_service::*;
