/// Application context and dependency wiring
use crate::{
    account::AccountManager,
    auth::TokenService,
    config::ServerConfig,
    consumption::ConsumptionManager,
    db,
    error::PortalResult,
    meter::MeterManager,
    rate_limit::RateLimiter,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub tokens: Arc<TokenService>,
    pub account_manager: Arc<AccountManager>,
    pub meter_manager: Arc<MeterManager>,
    pub consumption_manager: Arc<ConsumptionManager>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> PortalResult<Self> {
        config.validate()?;

        // Create data directory if it doesn't exist
        if !config.storage.data_directory.exists() {
            tokio::fs::create_dir_all(&config.storage.data_directory).await?;
        }

        // Initialize database
        let pool = db::create_pool(&config.storage.portal_db, db::DatabaseOptions::default())
            .await?;
        db::init_schema(&pool).await?;
        db::test_connection(&pool).await?;

        let config = Arc::new(config);

        // Signing key is loaded once here and never rotated at runtime
        let tokens = Arc::new(TokenService::new(
            &config.authentication.jwt_secret,
            config.authentication.token_ttl_minutes,
        ));

        let account_manager = Arc::new(AccountManager::new(
            pool.clone(),
            Arc::clone(&config),
            Arc::clone(&tokens),
        ));
        let meter_manager = Arc::new(MeterManager::new(pool.clone()));
        let consumption_manager = Arc::new(ConsumptionManager::new(pool.clone()));

        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limit));

        Ok(Self {
            config,
            db: pool,
            tokens,
            account_manager,
            meter_manager,
            consumption_manager,
            rate_limiter,
        })
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
