/// Password policy: strength validation and digest handling
use crate::error::{PortalError, PortalResult};
use bcrypt::{hash, verify, DEFAULT_COST};

/// Punctuation set counted towards the special-character requirement
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Check a candidate password against the portal policy.
///
/// Requires length >= 8 and at least one uppercase letter, one lowercase
/// letter, one digit, and one special character. No maximum length.
pub fn validate_strength(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| SPECIAL_CHARS.contains(c))
}

/// Produce a salted bcrypt digest for storage.
///
/// Two calls with the same input yield different digests; `verify_digest`
/// accepts any of them.
pub fn hash_password(password: &str) -> PortalResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| PortalError::Internal(format!("Password hashing failed: {}", e)))
}

/// bcrypt comparison against a stored digest. Malformed digests count as
/// a mismatch rather than an error.
pub fn verify_digest(password: &str, stored: &str) -> bool {
    verify(password, stored).unwrap_or(false)
}

/// Login-time verification.
///
/// Also accepts a stored value that is byte-equal to the submitted
/// password: credential rows created before digests were rolled out were
/// never rehashed. This is a migration shim kept for those records; it
/// must not be used for new writes, and every other verification path
/// goes through `verify_digest` alone.
pub fn verify_login(password: &str, stored: &str) -> bool {
    stored == password || verify_digest(password, stored)
}
