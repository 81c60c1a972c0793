//! Account-lifecycle state machine.
//!
//! Transition table:
//!
//! | action  | precondition | new status | side effects                         |
//! |---------|--------------|------------|--------------------------------------|
//! | approve | PENDING      | APPROVED   | set approval ts, approved mail       |
//! | reject  | PENDING      | REJECTED   | none                                 |
//! | block   | APPROVED     | BLOCKED    | clear approval ts, blocked mail      |
//! | enable  | BLOCKED      | APPROVED   | set approval ts, approved mail       |
//!
//! SUPERADMIN accounts are categorically protected from all four actions.

use std::sync::Arc;

use chrono::Utc;

use mealbridge_core::{
    AdminAction, AuditLog, DomainError, DomainResult, Identity, Role, User, UserDirectory, UserId,
    UserStatus,
};
use mealbridge_notify::{Notification, Notifier, Recipient};

/// The four admin-triggered lifecycle actions.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LifecycleAction {
    Approve,
    Reject,
    Block,
    Enable,
}

impl LifecycleAction {
    /// Parse the wire spelling (`approve` | `reject` | `block` | `enable`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(LifecycleAction::Approve),
            "reject" => Some(LifecycleAction::Reject),
            "block" => Some(LifecycleAction::Block),
            "enable" => Some(LifecycleAction::Enable),
            _ => None,
        }
    }

    /// Uppercased verb recorded in the audit trail.
    pub fn audit_code(&self) -> &'static str {
        match self {
            LifecycleAction::Approve => "APPROVE",
            LifecycleAction::Reject => "REJECT",
            LifecycleAction::Block => "BLOCK",
            LifecycleAction::Enable => "ENABLE",
        }
    }

    fn expected_status(&self) -> UserStatus {
        match self {
            LifecycleAction::Approve | LifecycleAction::Reject => UserStatus::Pending,
            LifecycleAction::Block => UserStatus::Approved,
            LifecycleAction::Enable => UserStatus::Blocked,
        }
    }

    fn new_status(&self) -> UserStatus {
        match self {
            LifecycleAction::Approve | LifecycleAction::Enable => UserStatus::Approved,
            LifecycleAction::Reject => UserStatus::Rejected,
            LifecycleAction::Block => UserStatus::Blocked,
        }
    }

    fn precondition_message(&self) -> &'static str {
        match self {
            LifecycleAction::Approve | LifecycleAction::Reject => "user is not pending approval",
            LifecycleAction::Block => "user is not approved",
            LifecycleAction::Enable => "user is not blocked",
        }
    }
}

/// Applies lifecycle transitions: conditional status update, one audit row,
/// best-effort notification.
///
/// Authorization is the caller's job; only a gated SUPERADMIN request should
/// ever reach this type.
#[derive(Clone)]
pub struct LifecycleManager {
    directory: Arc<dyn UserDirectory>,
    audit: Arc<dyn AuditLog>,
    notifier: Arc<dyn Notifier>,
}

impl LifecycleManager {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        audit: Arc<dyn AuditLog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            directory,
            audit,
            notifier,
        }
    }

    /// Apply one lifecycle action to a target user.
    ///
    /// The status write is a compare-and-swap on the precondition status: of
    /// two concurrent identical actions, exactly one succeeds and the loser
    /// fails with `InvalidTransition` without double-applying side effects.
    pub async fn apply(
        &self,
        admin: &Identity,
        target_id: UserId,
        action: LifecycleAction,
    ) -> DomainResult<User> {
        let target = self
            .directory
            .find_by_id(target_id)
            .await?
            .ok_or(DomainError::not_found("user"))?;

        if target.role == Role::Superadmin {
            return Err(DomainError::permission_denied(
                "cannot modify a SUPERADMIN account",
            ));
        }

        let expected = action.expected_status();
        if target.status != expected {
            return Err(DomainError::invalid_transition(
                action.precondition_message(),
            ));
        }

        let new_status = action.new_status();
        let approved_at = match new_status {
            UserStatus::Approved => Some(Utc::now()),
            UserStatus::Pending | UserStatus::Rejected | UserStatus::Blocked => None,
        };

        let updated = self
            .directory
            .transition_status(target_id, expected, new_status, approved_at)
            .await
            .map_err(|e| match e {
                // Lost the race: the row moved away from `expected` between
                // the read above and the conditional write.
                DomainError::InvalidTransition(_) => {
                    DomainError::invalid_transition(action.precondition_message())
                }
                other => other,
            })?;

        self.audit
            .append(AdminAction::new(
                admin.id,
                target_id,
                action.audit_code(),
                format!(
                    "Changed user status from {} to {}",
                    target.status, updated.status
                ),
            ))
            .await?;

        tracing::info!(
            admin_id = %admin.id,
            target_id = %target_id,
            action = action.audit_code(),
            from = %target.status,
            to = %updated.status,
            "applied lifecycle transition"
        );

        self.notify(action, &updated);
        Ok(updated)
    }

    /// Fire-and-forget notification for the transition. Delivery failure is
    /// the notifier's problem; the committed status change is never undone.
    fn notify(&self, action: LifecycleAction, user: &User) {
        let recipient = Recipient {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
        };

        match action {
            LifecycleAction::Approve | LifecycleAction::Enable => self
                .notifier
                .dispatch(Notification::AccountApproved { recipient }),
            LifecycleAction::Block => self
                .notifier
                .dispatch(Notification::AccountBlocked { recipient }),
            LifecycleAction::Reject => {}
        }
    }
}
