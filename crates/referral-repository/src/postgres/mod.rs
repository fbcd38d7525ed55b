//! PostgreSQL store implementations.

mod referral_store;

pub use referral_store::*;
