//! Referral service implementations.
//!
//! Trait definitions live in the parent module (`referral_service.rs`).

pub mod referral_service_impl;

pub use referral_service_impl::ReferralServiceComponent;
