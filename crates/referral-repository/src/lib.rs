//! # Referral Repository
//!
//! Durable store for referral mappings:
//!
//! ```text
//! ReferralCacheManager / ReferralService
//!   ↓  Arc<dyn ReferralStore>   (store interface)
//! PgReferralStore               (PostgreSQL / SQLx)
//!   ↓  Arc<dyn DatabasePoolInterface>
//! PostgreSQL
//! ```
//!
//! [`InMemoryReferralStore`] implements the same interface without a
//! database.

pub mod memory;
pub mod pool;
pub mod postgres;
pub mod traits;

pub use memory::InMemoryReferralStore;
pub use pool::*;
pub use postgres::*;
pub use traits::*;
