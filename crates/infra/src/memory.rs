//! In-memory stores for dev and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mealbridge_core::{
    AdminAction, AuditLog, DomainError, DomainResult, Identity, NewUser, Role, User, UserDirectory,
    UserId, UserStatus,
};

/// In-memory user store.
///
/// The conditional status update runs entirely under the write lock, which
/// gives it the same lost-update protection as the SQL
/// `UPDATE … WHERE status = expected` form.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned() -> DomainError {
    DomainError::storage("directory lock poisoned")
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn create(&self, input: NewUser) -> DomainResult<User> {
        let mut map = self.inner.write().map_err(|_| lock_poisoned())?;

        if map.values().any(|u| u.email == input.email) {
            return Err(DomainError::conflict("user with this email already exists"));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: input.email,
            password_hash: input.password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            profile: input.profile,
            role: input.role,
            status: input.status,
            created_at: now,
            updated_at: now,
            approved_at: input.approved_at,
        };

        map.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let map = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let map = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(map.values().find(|u| u.email == email).cloned())
    }

    async fn find_identity(&self, id: UserId) -> DomainResult<Option<Identity>> {
        let map = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(map.get(&id).map(User::identity))
    }

    async fn list_newest_first(&self) -> DomainResult<Vec<User>> {
        let map = self.inner.read().map_err(|_| lock_poisoned())?;
        let mut users: Vec<User> = map.values().cloned().collect();
        // UUIDv7 ids are time-ordered, which breaks created_at ties.
        users.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(users)
    }

    async fn role_exists(&self, role: Role) -> DomainResult<bool> {
        let map = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(map.values().any(|u| u.role == role))
    }

    async fn transition_status(
        &self,
        id: UserId,
        expected: UserStatus,
        new_status: UserStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> DomainResult<User> {
        let mut map = self.inner.write().map_err(|_| lock_poisoned())?;

        let user = map.get_mut(&id).ok_or(DomainError::not_found("user"))?;
        if user.status != expected {
            return Err(DomainError::invalid_transition(format!(
                "status is {}, expected {}",
                user.status, expected
            )));
        }

        user.status = new_status;
        user.approved_at = approved_at;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

/// In-memory append-only audit trail.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    inner: RwLock<Vec<AdminAction>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn append(&self, action: AdminAction) -> DomainResult<()> {
        let mut rows = self.inner.write().map_err(|_| lock_poisoned())?;
        rows.push(action);
        Ok(())
    }

    async fn for_target(&self, target: UserId) -> DomainResult<Vec<AdminAction>> {
        let rows = self.inner.read().map_err(|_| lock_poisoned())?;
        Ok(rows
            .iter()
            .filter(|a| a.target_user_id == target)
            .rev()
            .cloned()
            .collect())
    }
}
