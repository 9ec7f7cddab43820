/// Meter registry

mod manager;

pub use manager::MeterManager;

use serde::{Deserialize, Serialize};

/// Meter registration request.
///
/// `actor_id` optionally names the user the registration is performed as;
/// only elevated callers may act as someone else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterMeterRequest {
    pub serial: String,
    pub owner_id: i64,
    pub actor_id: Option<i64>,
}
