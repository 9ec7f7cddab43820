/// Portal database models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Credential record: login identity plus mutable security state
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Credential {
    pub id: i64,
    pub username: String,
    /// bcrypt digest; un-migrated records may still hold the raw password
    pub password_hash: String,
    pub user_id: i64,
    pub role_id: i64,
    pub failed_attempts: i64,
    pub lock_reason: String,
}

/// User profile record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub created_at: DateTime<Utc>,
}

/// Registered smart meter
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Meter {
    pub id: i64,
    pub serial: String,
    pub owner_id: i64,
    /// User id of the administrator who registered the meter
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

/// One energy-consumption reading
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub id: i64,
    pub meter_id: i64,
    pub consumption_kwh: f64,
    pub recorded_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}
