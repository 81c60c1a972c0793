//! Persistence contracts implemented by `mealbridge-infra`.
//!
//! The traits live here so that domain services (registration, the lifecycle
//! manager) depend only on the contract, and storage backends can be swapped
//! for test doubles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::audit::AdminAction;
use crate::error::DomainResult;
use crate::id::UserId;
use crate::user::{Identity, NewUser, Role, User, UserStatus};

/// The user store.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Insert a new user. Fails with `DomainError::Conflict` when the email
    /// is already taken; no row is created in that case.
    async fn create(&self, input: NewUser) -> DomainResult<User>;

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Minimal projection for session resolution (id, email, name, role,
    /// status). Returns `None` for unknown users.
    async fn find_identity(&self, id: UserId) -> DomainResult<Option<Identity>>;

    /// All users, newest first.
    async fn list_newest_first(&self) -> DomainResult<Vec<User>>;

    /// Whether any user with the given role exists (bootstrap check).
    async fn role_exists(&self, role: Role) -> DomainResult<bool>;

    /// Conditionally move a user from `expected` to `new_status`, updating the
    /// approval timestamp to `approved_at` in the same write.
    ///
    /// The status check and the write are one atomic step: if the row's status
    /// is no longer `expected` (e.g. a concurrent admin won the race), this
    /// fails with `DomainError::InvalidTransition` and changes nothing.
    async fn transition_status(
        &self,
        id: UserId,
        expected: UserStatus,
        new_status: UserStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> DomainResult<User>;
}

/// Append-only audit trail of admin actions.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, action: AdminAction) -> DomainResult<()>;

    /// Audit rows for one target user, newest first.
    async fn for_target(&self, target: UserId) -> DomainResult<Vec<AdminAction>>;
}
