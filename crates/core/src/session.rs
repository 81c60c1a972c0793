//! Donation-session references.
//!
//! The session workflow itself is not implemented; the reference format is
//! part of the notification contract (session-started mails carry it) and is
//! kept here so both sides agree on it.

use chrono::Utc;
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a human-readable donation-session reference, e.g.
/// `DS-MB3K2F1A-X7Q29Z`. Uppercase, unique enough for support tickets and
/// email subjects; not a security token.
pub fn session_reference() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;

    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..36)] as char)
        .collect();

    format!("DS-{}-{}", base36(millis), suffix).to_uppercase()
}

fn base36(mut n: u64) -> String {
    if n == 0 {
        return "0".into();
    }
    let mut out = String::new();
    while n > 0 {
        out.insert(0, BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_has_expected_shape() {
        let reference = session_reference();
        let parts: Vec<&str> = reference.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "DS");
        assert!(!parts[1].is_empty());
        assert_eq!(parts[2].len(), 6);
        assert_eq!(reference, reference.to_uppercase());
    }

    #[test]
    fn references_are_distinct() {
        let a = session_reference();
        let b = session_reference();
        assert_ne!(a, b);
    }

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(36 * 36 + 1), "101");
    }
}
