/// Consumption readings

mod manager;

pub use manager::ConsumptionManager;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append a reading for a meter (by meter row id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddReadingRequest {
    pub meter_id: i64,
    pub consumption_kwh: f64,
}

/// Amend an existing reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReadingRequest {
    pub id: i64,
    pub consumption_kwh: f64,
}

/// Reading row joined with the meter serial it belongs to
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ReadingRow {
    pub id: i64,
    pub serial: String,
    pub consumption_kwh: f64,
    pub recorded_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}
