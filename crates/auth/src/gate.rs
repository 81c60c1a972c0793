//! Role-based authorization gate.
//!
//! The single authorization predicate of the system: no IO, no panics, no
//! per-resource ownership checks beyond it.

use thiserror::Error;

use mealbridge_core::{Identity, Role, UserStatus};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateError {
    /// No resolved identity on the request.
    #[error("not authenticated")]
    Unauthenticated,

    /// Authenticated, but wrong role or non-APPROVED status.
    #[error("forbidden")]
    Forbidden,
}

/// `true` iff `identity` is present, APPROVED, and carries one of
/// `allowed_roles`.
///
/// APPROVED is required for everyone; a PENDING or BLOCKED SUPERADMIN is
/// denied like anyone else.
pub fn allow(identity: Option<&Identity>, allowed_roles: &[Role]) -> bool {
    require_role(identity, allowed_roles).is_ok()
}

/// Gate an identity, distinguishing "who are you" (401) from "you may not"
/// (403) for the API layer.
pub fn require_role<'a>(
    identity: Option<&'a Identity>,
    allowed_roles: &[Role],
) -> Result<&'a Identity, GateError> {
    let identity = identity.ok_or(GateError::Unauthenticated)?;

    match identity.status {
        UserStatus::Approved => {}
        UserStatus::Pending | UserStatus::Rejected | UserStatus::Blocked => {
            return Err(GateError::Forbidden);
        }
    }

    if allowed_roles.contains(&identity.role) {
        Ok(identity)
    } else {
        Err(GateError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealbridge_core::UserId;

    fn identity(role: Role, status: UserStatus) -> Identity {
        Identity {
            id: UserId::new(),
            email: "u@example.org".into(),
            first_name: "U".into(),
            last_name: "Ser".into(),
            role,
            status,
        }
    }

    #[test]
    fn missing_identity_is_denied() {
        assert!(!allow(None, &[Role::Donor]));
        assert_eq!(
            require_role(None, &[Role::Superadmin]).unwrap_err(),
            GateError::Unauthenticated
        );
    }

    #[test]
    fn non_approved_status_is_denied_for_every_role() {
        for role in [Role::Donor, Role::Receiver, Role::Superadmin] {
            for status in [UserStatus::Pending, UserStatus::Rejected, UserStatus::Blocked] {
                let id = identity(role, status);
                assert!(
                    !allow(Some(&id), &[role]),
                    "{role} with status {status} must be denied"
                );
            }
        }
    }

    #[test]
    fn approved_with_matching_role_is_allowed() {
        let id = identity(Role::Receiver, UserStatus::Approved);
        assert!(allow(Some(&id), &[Role::Donor, Role::Receiver]));
    }

    #[test]
    fn approved_with_wrong_role_is_forbidden() {
        let id = identity(Role::Donor, UserStatus::Approved);
        assert_eq!(
            require_role(Some(&id), &[Role::Superadmin]).unwrap_err(),
            GateError::Forbidden
        );
    }

    #[test]
    fn empty_role_set_denies_everyone() {
        let id = identity(Role::Superadmin, UserStatus::Approved);
        assert!(!allow(Some(&id), &[]));
    }
}
