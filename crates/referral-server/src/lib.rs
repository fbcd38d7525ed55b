//! # Referral Server Library
//!
//! Dependency injection wiring and startup utilities for the referral cache
//! process. The binary built from this crate only wires the module and runs
//! a health check; callers reach the referral operations by resolving
//! `ReferralService` from [`di::ReferralModule`].

pub mod di;
pub mod startup;
