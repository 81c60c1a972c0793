//! `mealbridge-infra` — storage backends and startup provisioning.
//!
//! In-memory implementations serve dev and tests; the `postgres` feature adds
//! sqlx-backed stores with the same contracts.

pub mod bootstrap;
pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use bootstrap::ensure_superadmin;
pub use memory::{InMemoryAuditLog, InMemoryDirectory};

#[cfg(feature = "postgres")]
pub use postgres::{migrate, PgAuditLog, PgDirectory};
