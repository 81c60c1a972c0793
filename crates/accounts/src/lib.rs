//! `mealbridge-accounts` — registration and the account-lifecycle state
//! machine.
//!
//! Callers are expected to have passed the authorization gate already; the
//! lifecycle manager performs no authorization of its own.

pub mod lifecycle;
pub mod registration;

pub use lifecycle::{LifecycleAction, LifecycleManager};
pub use registration::{register, Registration};
