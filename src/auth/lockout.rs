/// Failed-login lockout state machine
use serde::{Deserialize, Serialize};

/// Failed attempts at which an account locks
pub const LOCKOUT_THRESHOLD: i64 = 5;

/// Reason recorded on the credential row by the locking increment
pub const LOCK_REASON: &str = "Too many failed attempts";

/// Lockout state derived from the persisted failed-attempt counter.
///
/// The counter itself lives on the credential row; this enum is a pure
/// view of it. A successful login never moves the counter back -- only an
/// administrative unlock returns an account to `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockState {
    /// More than one attempt remaining
    Open,
    /// Next failed attempt locks the account
    Warning,
    /// Authentication is rejected before any password comparison
    Locked,
}

impl LockState {
    /// Derive the state from a counter value and threshold
    pub fn from_attempts(failed_attempts: i64, threshold: i64) -> Self {
        if failed_attempts >= threshold {
            LockState::Locked
        } else if failed_attempts == threshold - 1 {
            LockState::Warning
        } else {
            LockState::Open
        }
    }

    pub fn is_locked(self) -> bool {
        matches!(self, LockState::Locked)
    }
}
