//! User domain model.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::id::UserId;

/// Account role. Fixed at creation, never changed afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Donor,
    Receiver,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => "DONOR",
            Role::Receiver => "RECEIVER",
            Role::Superadmin => "SUPERADMIN",
        }
    }

    /// Roles a self-registered account may take. SUPERADMIN only ever comes
    /// from the bootstrap path.
    pub fn is_registrable(&self) -> bool {
        match self {
            Role::Donor | Role::Receiver => true,
            Role::Superadmin => false,
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DONOR" => Ok(Role::Donor),
            "RECEIVER" => Ok(Role::Receiver),
            "SUPERADMIN" => Ok(Role::Superadmin),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account lifecycle status.
///
/// PENDING → APPROVED | REJECTED; APPROVED ⇄ BLOCKED; REJECTED is terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Pending,
    Approved,
    Rejected,
    Blocked,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "PENDING",
            UserStatus::Approved => "APPROVED",
            UserStatus::Rejected => "REJECTED",
            UserStatus::Blocked => "BLOCKED",
        }
    }
}

impl FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(UserStatus::Pending),
            "APPROVED" => Ok(UserStatus::Approved),
            "REJECTED" => Ok(UserStatus::Rejected),
            "BLOCKED" => Ok(UserStatus::Blocked),
            other => Err(DomainError::validation(format!("unknown status: {other}"))),
        }
    }
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional profile details captured at registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Full user record as stored in the directory.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Bcrypt hash. Never serialized out of the API layer.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub profile: Profile,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl User {
    /// Minimal projection used by the session resolver and the gate.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
            status: self.status,
        }
    }
}

/// Authenticated identity: what a resolved session knows about its user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub status: UserStatus,
}

/// Input for creating a user row. The password is already hashed here; the
/// directory never sees plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub status: UserStatus,
    pub profile: Profile,
    pub approved_at: Option<DateTime<Utc>>,
}
