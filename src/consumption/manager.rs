/// Consumption data operations
use crate::{
    consumption::ReadingRow,
    error::{PortalError, PortalResult},
};
use chrono::Utc;
use sqlx::SqlitePool;

/// Upper bound on rows returned by the admin listing
const ADMIN_LIST_LIMIT: i64 = 10_000;

/// Consumption readings service
#[derive(Clone)]
pub struct ConsumptionManager {
    db: SqlitePool,
}

impl ConsumptionManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// List readings across all meters (admin view, bounded)
    pub async fn list_all(&self) -> PortalResult<Vec<ReadingRow>> {
        let rows = sqlx::query_as::<_, ReadingRow>(
            "SELECT c.id, m.serial, c.consumption_kwh, c.recorded_at, c.modified_at
             FROM consumption_data c
             INNER JOIN meters m ON c.meter_id = m.id
             ORDER BY c.id
             LIMIT ?1",
        )
        .bind(ADMIN_LIST_LIMIT)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// List readings for every meter owned by one user
    pub async fn list_for_owner(&self, owner_id: i64) -> PortalResult<Vec<ReadingRow>> {
        let rows = sqlx::query_as::<_, ReadingRow>(
            "SELECT c.id, m.serial, c.consumption_kwh, c.recorded_at, c.modified_at
             FROM consumption_data c
             INNER JOIN meters m ON c.meter_id = m.id
             WHERE m.owner_id = ?1
             ORDER BY c.id",
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Append a reading for a meter
    pub async fn add(&self, meter_id: i64, consumption_kwh: f64) -> PortalResult<i64> {
        if !consumption_kwh.is_finite() || consumption_kwh < 0.0 {
            return Err(PortalError::Validation(
                "Consumption must be a non-negative number".to_string(),
            ));
        }

        let meter_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meters WHERE id = ?1")
            .bind(meter_id)
            .fetch_one(&self.db)
            .await?;
        if meter_exists == 0 {
            return Err(PortalError::Validation("Unknown meter".to_string()));
        }

        let result = sqlx::query(
            "INSERT INTO consumption_data (meter_id, consumption_kwh, recorded_at)
             VALUES (?1, ?2, ?3)",
        )
        .bind(meter_id)
        .bind(consumption_kwh)
        .bind(Utc::now())
        .execute(&self.db)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Amend a reading, stamping the modification time
    pub async fn update(&self, id: i64, consumption_kwh: f64) -> PortalResult<()> {
        if !consumption_kwh.is_finite() || consumption_kwh < 0.0 {
            return Err(PortalError::Validation(
                "Consumption must be a non-negative number".to_string(),
            ));
        }

        let result = sqlx::query(
            "UPDATE consumption_data
             SET consumption_kwh = ?1, modified_at = ?2
             WHERE id = ?3",
        )
        .bind(consumption_kwh)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PortalError::NotFound("Reading not found".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::meter::MeterManager;

    async fn create_test_managers() -> (ConsumptionManager, MeterManager) {
        // Meters are registered here with synthetic owner ids that have no
        // parent `users` row; disable FK enforcement (sqlx turns it on by
        // default) so reading logic can be tested in isolation. Production
        // wiring in `db::create_pool` keeps FKs on.
        let opts = <sqlx::sqlite::SqliteConnectOptions as std::str::FromStr>::from_str(":memory:")
            .unwrap()
            .foreign_keys(false);
        let pool = SqlitePool::connect_with(opts).await.unwrap();
        db::init_schema(&pool).await.unwrap();
        (
            ConsumptionManager::new(pool.clone()),
            MeterManager::new(pool),
        )
    }

    #[tokio::test]
    async fn test_add_and_list_joined_to_serial() {
        let (consumption, meters) = create_test_managers().await;

        let meter_a = meters.register("SM-1001", 1, 99).await.unwrap();
        let meter_b = meters.register("SM-2001", 2, 99).await.unwrap();

        consumption.add(meter_a.id, 12.5).await.unwrap();
        consumption.add(meter_a.id, 13.0).await.unwrap();
        consumption.add(meter_b.id, 7.25).await.unwrap();

        let all = consumption.list_all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].serial, "SM-1001");

        let owned = consumption.list_for_owner(1).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|r| r.serial == "SM-1001"));
        assert!(owned.iter().all(|r| r.modified_at.is_none()));
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_meter() {
        let (consumption, _meters) = create_test_managers().await;

        assert!(matches!(
            consumption.add(42, 1.0).await,
            Err(PortalError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_add_rejects_bad_values() {
        let (consumption, meters) = create_test_managers().await;
        let meter = meters.register("SM-1001", 1, 99).await.unwrap();

        assert!(matches!(
            consumption.add(meter.id, -1.0).await,
            Err(PortalError::Validation(_))
        ));
        assert!(matches!(
            consumption.add(meter.id, f64::NAN).await,
            Err(PortalError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_stamps_modification_time() {
        let (consumption, meters) = create_test_managers().await;

        let meter = meters.register("SM-1001", 1, 99).await.unwrap();
        let id = consumption.add(meter.id, 12.5).await.unwrap();

        consumption.update(id, 14.0).await.unwrap();

        let rows = consumption.list_for_owner(1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].consumption_kwh, 14.0);
        assert!(rows[0].modified_at.is_some());
    }

    #[tokio::test]
    async fn test_update_unknown_reading() {
        let (consumption, _meters) = create_test_managers().await;

        assert!(matches!(
            consumption.update(42, 1.0).await,
            Err(PortalError::NotFound(_))
        ));
    }
}
