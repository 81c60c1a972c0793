//! Self-registration of donors and receivers.

use mealbridge_core::{
    DomainError, DomainResult, NewUser, Profile, Role, User, UserDirectory, UserStatus,
};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub profile: Profile,
}

/// Register a new account.
///
/// Every self-registered account starts PENDING; an admin decides from there.
/// The duplicate-email check is a courtesy pre-check; the directory enforces
/// uniqueness on insert, so a racing duplicate still fails with a conflict.
pub async fn register(directory: &dyn UserDirectory, input: Registration) -> DomainResult<User> {
    validate(&input)?;

    if directory.find_by_email(&input.email).await?.is_some() {
        return Err(DomainError::conflict("user with this email already exists"));
    }

    let password_hash = mealbridge_auth::hash_password(&input.password)?;

    let user = directory
        .create(NewUser {
            email: input.email,
            password_hash,
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.role,
            status: UserStatus::Pending,
            profile: input.profile,
            approved_at: None,
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "registered new account");
    Ok(user)
}

fn validate(input: &Registration) -> DomainResult<()> {
    if input.email.trim().is_empty()
        || input.first_name.trim().is_empty()
        || input.last_name.trim().is_empty()
    {
        return Err(DomainError::validation("missing required fields"));
    }

    if !input.email.contains('@') {
        return Err(DomainError::validation("invalid email address"));
    }

    if input.password.len() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if !input.role.is_registrable() {
        return Err(DomainError::validation(
            "invalid role; must be DONOR or RECEIVER",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealbridge_infra::InMemoryDirectory;

    fn registration(email: &str, role: Role) -> Registration {
        Registration {
            email: email.into(),
            password: "long-enough-pw".into(),
            first_name: "Dana".into(),
            last_name: "Prasai".into(),
            role,
            profile: Profile::default(),
        }
    }

    #[tokio::test]
    async fn registered_user_starts_pending_with_verifiable_hash() {
        let directory = InMemoryDirectory::new();
        let user = register(&directory, registration("a@x.com", Role::Donor))
            .await
            .unwrap();

        assert_eq!(user.status, UserStatus::Pending);
        assert_eq!(user.role, Role::Donor);
        assert!(user.approved_at.is_none());
        assert_ne!(user.password_hash, "long-enough-pw");
        assert!(mealbridge_auth::verify_password("long-enough-pw", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_and_creates_no_row() {
        let directory = InMemoryDirectory::new();
        register(&directory, registration("a@x.com", Role::Donor))
            .await
            .unwrap();

        let err = register(&directory, registration("a@x.com", Role::Receiver))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(directory.list_newest_first().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn superadmin_role_is_not_registrable() {
        let directory = InMemoryDirectory::new();
        let err = register(&directory, registration("a@x.com", Role::Superadmin))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let directory = InMemoryDirectory::new();
        let mut input = registration("a@x.com", Role::Donor);
        input.password = "short".into();

        let err = register(&directory, input).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(directory.list_newest_first().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let directory = InMemoryDirectory::new();
        let mut input = registration("a@x.com", Role::Donor);
        input.first_name = "  ".into();

        assert!(register(&directory, input).await.is_err());
    }
}
