//! # Referral Core
//!
//! Core types and error definitions shared by every layer of the referral
//! cache: the unified error enum, typed user ids, the referral mapping entity
//! and logging initialization.

pub mod error;
pub mod id;
pub mod referral;
pub mod result;
pub mod telemetry;

pub use error::*;
pub use id::*;
pub use referral::*;
pub use result::*;

// Re-export shaku for dependency injection
pub use shaku::{module, HasComponent, Interface};
