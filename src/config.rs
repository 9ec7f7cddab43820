/// Configuration management for the Gridpoint portal
use crate::auth::lockout::LOCKOUT_THRESHOLD;
use crate::auth::token::DEFAULT_TTL_MINUTES;
use crate::error::{PortalError, PortalResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub portal_db: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret, loaded once at startup and never rotated at runtime
    pub jwt_secret: String,
    /// Bearer token lifetime in minutes
    pub token_ttl_minutes: i64,
    /// Failed logins at which an account locks
    pub lockout_threshold: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Per-minute quota for credential endpoints (login, signup)
    pub credential_requests_per_minute: u32,
    /// Per-minute quota for everything else
    pub general_requests_per_minute: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> PortalResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("GRID_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("GRID_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| PortalError::Validation("Invalid port number".to_string()))?;
        let version = env::var("GRID_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

        let data_directory: PathBuf = env::var("GRID_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let portal_db = env::var("GRID_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("gridpoint.sqlite"));

        let jwt_secret = env::var("GRID_JWT_SECRET")
            .map_err(|_| PortalError::Validation("JWT secret required".to_string()))?;
        let token_ttl_minutes = env::var("GRID_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TTL_MINUTES);
        let lockout_threshold = env::var("GRID_LOCKOUT_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(LOCKOUT_THRESHOLD);

        let rate_limit_enabled = env::var("GRID_RATE_LIMITS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);
        let credential_requests_per_minute = env::var("GRID_RATE_LIMIT_CREDENTIAL_PER_MINUTE")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);
        let general_requests_per_minute = env::var("GRID_RATE_LIMIT_GENERAL_PER_MINUTE")
            .unwrap_or_else(|_| "240".to_string())
            .parse()
            .unwrap_or(240);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
            },
            storage: StorageConfig {
                data_directory,
                portal_db,
            },
            authentication: AuthConfig {
                jwt_secret,
                token_ttl_minutes,
                lockout_threshold,
            },
            rate_limit: RateLimitConfig {
                enabled: rate_limit_enabled,
                credential_requests_per_minute,
                general_requests_per_minute,
            },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> PortalResult<()> {
        if self.service.hostname.is_empty() {
            return Err(PortalError::Validation(
                "Hostname cannot be empty".to_string(),
            ));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(PortalError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.token_ttl_minutes <= 0 {
            return Err(PortalError::Validation(
                "Token TTL must be positive".to_string(),
            ));
        }

        if self.authentication.lockout_threshold <= 0 {
            return Err(PortalError::Validation(
                "Lockout threshold must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
