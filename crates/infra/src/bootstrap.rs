//! Superadmin provisioning.

use mealbridge_core::{NewUser, Profile, Role, User, UserDirectory, UserStatus};

/// Ensure the SUPERADMIN bootstrap account exists.
///
/// Idempotent: if any SUPERADMIN is already present nothing happens and
/// `Ok(None)` is returned. The created account is pre-approved: the gate
/// requires APPROVED status even for SUPERADMIN, and nobody else could
/// approve the first admin.
pub async fn ensure_superadmin(
    directory: &dyn UserDirectory,
    email: &str,
    password: &str,
) -> mealbridge_core::DomainResult<Option<User>> {
    if directory.role_exists(Role::Superadmin).await? {
        tracing::debug!("superadmin account already present");
        return Ok(None);
    }

    let password_hash = mealbridge_auth::hash_password(password)?;
    let user = directory
        .create(NewUser {
            email: email.into(),
            password_hash,
            first_name: "Super".into(),
            last_name: "Admin".into(),
            role: Role::Superadmin,
            status: UserStatus::Approved,
            profile: Profile::default(),
            approved_at: Some(chrono::Utc::now()),
        })
        .await?;

    tracing::info!(user_id = %user.id, email, "created superadmin account");
    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDirectory;

    #[tokio::test]
    async fn creates_approved_superadmin_once() {
        let directory = InMemoryDirectory::new();

        let created = ensure_superadmin(&directory, "root@example.org", "bootstrap-pw")
            .await
            .unwrap()
            .expect("first call creates the account");
        assert_eq!(created.role, Role::Superadmin);
        assert_eq!(created.status, UserStatus::Approved);
        assert!(created.approved_at.is_some());

        let again = ensure_superadmin(&directory, "other@example.org", "bootstrap-pw")
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(directory.list_newest_first().await.unwrap().len(), 1);
    }
}
