//! Password hashing and verification (bcrypt).

use mealbridge_core::DomainError;

/// Bcrypt work factor. Each increment doubles hashing cost.
pub const BCRYPT_COST: u32 = 12;

/// Hash a plaintext password with a per-hash random salt.
pub fn hash_password(password: &str) -> Result<String, DomainError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| DomainError::crypto(format!("bcrypt hash: {e}")))
}

/// Verify a plaintext password against a stored bcrypt hash.
///
/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is not a
/// valid bcrypt string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, DomainError> {
    bcrypt::verify(password, hash).map_err(|e| DomainError::crypto(format!("bcrypt verify: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cost 12 makes each hash slow on purpose; tests share one hash.
    fn hashed() -> &'static str {
        use std::sync::OnceLock;
        static HASH: OnceLock<String> = OnceLock::new();
        HASH.get_or_init(|| hash_password("hunter2!pass").unwrap())
    }

    #[test]
    fn correct_password_matches() {
        assert!(verify_password("hunter2!pass", hashed()).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        assert!(!verify_password("wrong", hashed()).unwrap());
    }

    #[test]
    fn hash_never_equals_the_password() {
        assert_ne!(hashed(), "hunter2!pass");
        assert!(hashed().starts_with("$2"));
    }

    #[test]
    fn malformed_hash_returns_error() {
        assert!(verify_password("pw", "not-a-bcrypt-hash").is_err());
    }
}
