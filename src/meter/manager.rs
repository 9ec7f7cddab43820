/// Meter registry operations
use crate::{
    db::models::Meter,
    error::{PortalError, PortalResult},
};
use chrono::Utc;
use sqlx::SqlitePool;

/// Meter registry service
#[derive(Clone)]
pub struct MeterManager {
    db: SqlitePool,
}

impl MeterManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// List every meter in the system (admin view)
    pub async fn list_all(&self) -> PortalResult<Vec<Meter>> {
        let meters = sqlx::query_as::<_, Meter>(
            "SELECT id, serial, owner_id, created_by, created_at FROM meters ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(meters)
    }

    /// List meters owned by one user
    pub async fn list_for_owner(&self, owner_id: i64) -> PortalResult<Vec<Meter>> {
        let meters = sqlx::query_as::<_, Meter>(
            "SELECT id, serial, owner_id, created_by, created_at
             FROM meters WHERE owner_id = ?1 ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(meters)
    }

    /// Register a meter serial for an owner
    pub async fn register(
        &self,
        serial: &str,
        owner_id: i64,
        created_by: i64,
    ) -> PortalResult<Meter> {
        let serial = serial.trim();
        if serial.is_empty() {
            return Err(PortalError::Validation(
                "Meter serial cannot be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO meters (serial, owner_id, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(serial)
        .bind(owner_id)
        .bind(created_by)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                PortalError::Validation("Meter serial already registered".to_string())
            }
            _ => PortalError::Database(e),
        })?;

        tracing::info!(serial = %serial, owner_id, created_by, "Meter registered");

        Ok(Meter {
            id: result.last_insert_rowid(),
            serial: serial.to_string(),
            owner_id,
            created_by,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn create_test_manager() -> MeterManager {
        // These unit tests register meters with synthetic owner ids that
        // have no parent `users` row; disable FK enforcement (sqlx turns
        // it on by default) so the registry logic can be tested in
        // isolation. Production wiring in `db::create_pool` keeps FKs on.
        let opts = <sqlx::sqlite::SqliteConnectOptions as std::str::FromStr>::from_str(":memory:")
            .unwrap()
            .foreign_keys(false);
        let pool = SqlitePool::connect_with(opts).await.unwrap();
        db::init_schema(&pool).await.unwrap();
        MeterManager::new(pool)
    }

    #[tokio::test]
    async fn test_register_and_list() {
        let manager = create_test_manager().await;

        let meter = manager.register("SM-1001", 1, 99).await.unwrap();
        assert_eq!(meter.serial, "SM-1001");
        assert_eq!(meter.owner_id, 1);
        assert_eq!(meter.created_by, 99);

        manager.register("SM-1002", 2, 99).await.unwrap();

        let all = manager.list_all().await.unwrap();
        assert_eq!(all.len(), 2);

        let owned = manager.list_for_owner(1).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].serial, "SM-1001");

        assert!(manager.list_for_owner(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_serial_rejected() {
        let manager = create_test_manager().await;

        manager.register("SM-1001", 1, 99).await.unwrap();

        match manager.register("SM-1001", 2, 99).await {
            Err(PortalError::Validation(msg)) => assert!(msg.contains("already registered")),
            other => panic!("expected Validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_empty_serial_rejected() {
        let manager = create_test_manager().await;

        assert!(matches!(
            manager.register("   ", 1, 99).await,
            Err(PortalError::Validation(_))
        ));
    }
}
