//! `mealbridge-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: password
//! hashing, session-token issuance/validation, and the role gate. Wiring
//! tokens to cookies and identities to live directory rows happens in the API
//! layer.

pub mod gate;
pub mod password;
pub mod token;

pub use gate::{allow, require_role, GateError};
pub use password::{hash_password, verify_password, BCRYPT_COST};
pub use token::{SessionClaims, TokenError, TokenService, TOKEN_TTL_DAYS};
