//! Admin-action audit model.
//!
//! One row per lifecycle transition, append-only: rows are never updated or
//! deleted once written.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::id::{AdminActionId, UserId};

#[derive(Debug, Clone, Serialize)]
pub struct AdminAction {
    pub id: AdminActionId,
    /// The SUPERADMIN who performed the action.
    pub admin_id: UserId,
    pub target_user_id: UserId,
    /// Uppercased action verb, e.g. `APPROVE`.
    pub action: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

impl AdminAction {
    pub fn new(
        admin_id: UserId,
        target_user_id: UserId,
        action: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: AdminActionId::new(),
            admin_id,
            target_user_id,
            action: action.into(),
            details: details.into(),
            created_at: Utc::now(),
        }
    }
}
