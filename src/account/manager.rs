/// Account manager implementation using runtime queries
use crate::{
    account::{SignupRequest, UpdateProfileRequest, UserSummary},
    auth::{
        lockout::{LockState, LOCK_REASON},
        password,
        guard::Role,
        token::TokenService,
    },
    config::ServerConfig,
    db::models::{Credential, UserProfile},
    error::{PortalError, PortalResult},
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

const POLICY_MESSAGE: &str = "Password must be at least 8 characters long, \
     include an uppercase letter, a lowercase letter, a number, and a special character";

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    config: Arc<ServerConfig>,
    tokens: Arc<TokenService>,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>, tokens: Arc<TokenService>) -> Self {
        Self { db, config, tokens }
    }

    /// Create a new account and issue its first token.
    ///
    /// Writes the profile row and the credential row in one transaction;
    /// every new account starts as an ordinary user with a zeroed
    /// lockout counter.
    pub async fn signup(&self, req: SignupRequest) -> PortalResult<String> {
        let username = req.username.trim().to_string();

        if username.is_empty() {
            return Err(PortalError::Validation(
                "Username cannot be empty".to_string(),
            ));
        }

        validate_email(&req.email)?;

        if !password::validate_strength(&req.password) {
            return Err(PortalError::Validation(POLICY_MESSAGE.to_string()));
        }

        if self.username_exists(&username).await? {
            return Err(PortalError::Validation(
                "Username already exists".to_string(),
            ));
        }

        let password_hash = password::hash_password(&req.password)?;
        let now = Utc::now();

        let mut tx = self.db.begin().await?;

        let result = sqlx::query(
            "INSERT INTO users (first_name, last_name, phone, email, address, city, zip_code, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.phone)
        .bind(&req.email)
        .bind(&req.address)
        .bind(&req.city)
        .bind(&req.zip_code)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                PortalError::Validation("Email already registered".to_string())
            }
            _ => PortalError::Database(e),
        })?;

        let user_id = result.last_insert_rowid();

        sqlx::query(
            "INSERT INTO credentials (username, password_hash, user_id, role_id, failed_attempts, lock_reason)
             VALUES (?1, ?2, ?3, ?4, 0, '')",
        )
        .bind(&username)
        .bind(&password_hash)
        .bind(user_id)
        .bind(Role::User.as_id())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(username = %username, user_id, "Account created");

        self.tokens.issue(user_id, &username, Role::User.as_id())
    }

    /// Authenticate a login attempt and issue a token.
    ///
    /// A locked account is rejected before any password comparison. An
    /// unknown username produces the same error as a wrong password so
    /// responses cannot be used to enumerate usernames.
    pub async fn login(&self, username: &str, submitted_password: &str) -> PortalResult<String> {
        let username = username.trim();

        let cred = self
            .find_credential(username)
            .await?
            .ok_or_else(|| PortalError::Authentication("Invalid credentials".to_string()))?;

        let threshold = self.config.authentication.lockout_threshold;
        if LockState::from_attempts(cred.failed_attempts, threshold).is_locked() {
            tracing::warn!(username = %username, "Login attempt on locked account");
            return Err(PortalError::AccountLocked);
        }

        if password::verify_login(submitted_password, &cred.password_hash) {
            // The failed-attempt counter is deliberately left untouched on
            // success; only an administrative unlock clears it.
            tracing::info!(username = %username, "Login successful");
            return self.tokens.issue(cred.user_id, &cred.username, cred.role_id);
        }

        self.record_failed_attempt(username, threshold).await?;
        tracing::info!(username = %username, "Login failed");

        Err(PortalError::Authentication("Invalid credentials".to_string()))
    }

    /// Bump the failed-attempt counter by one atomic UPDATE.
    ///
    /// The increment that reaches the threshold also stamps the lock
    /// reason, in the same statement, so concurrent failures can only
    /// push the counter further up -- never skip the reason.
    async fn record_failed_attempt(&self, username: &str, threshold: i64) -> PortalResult<()> {
        sqlx::query(
            "UPDATE credentials
             SET failed_attempts = failed_attempts + 1,
                 lock_reason = CASE
                     WHEN failed_attempts + 1 >= ?1 THEN ?2
                     ELSE lock_reason
                 END
             WHERE username = ?3",
        )
        .bind(threshold)
        .bind(LOCK_REASON)
        .bind(username)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Administrative unlock: the only path that resets the counter
    pub async fn unlock_account(&self, username: &str) -> PortalResult<()> {
        let result = sqlx::query(
            "UPDATE credentials SET failed_attempts = 0, lock_reason = '' WHERE username = ?1",
        )
        .bind(username.trim())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PortalError::NotFound("Account not found".to_string()));
        }

        tracing::info!(username = %username, "Account unlocked");

        Ok(())
    }

    /// Change a password after re-verifying the old one.
    ///
    /// The old-password check is digest-only: the plaintext login shim
    /// does not extend here. Unknown usernames produce the same error as
    /// a wrong old password.
    pub async fn change_password(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> PortalResult<()> {
        if !password::validate_strength(new_password) {
            return Err(PortalError::Validation(POLICY_MESSAGE.to_string()));
        }

        let username = username.trim();
        let cred = self
            .find_credential(username)
            .await?
            .ok_or_else(|| {
                PortalError::Authentication("Invalid username or password".to_string())
            })?;

        if !password::verify_digest(old_password, &cred.password_hash) {
            return Err(PortalError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let new_hash = password::hash_password(new_password)?;

        sqlx::query("UPDATE credentials SET password_hash = ?1 WHERE username = ?2")
            .bind(&new_hash)
            .bind(username)
            .execute(&self.db)
            .await?;

        tracing::info!(username = %username, "Password changed");

        Ok(())
    }

    /// Delete an account: the credential row and its profile row
    pub async fn delete_account(&self, username: &str) -> PortalResult<()> {
        let cred = self
            .find_credential(username.trim())
            .await?
            .ok_or_else(|| PortalError::NotFound("Account not found".to_string()))?;

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM credentials WHERE id = ?1")
            .bind(cred.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(cred.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(username = %username, user_id = cred.user_id, "Account deleted");

        Ok(())
    }

    /// Look up a credential row by username
    pub async fn find_credential(&self, username: &str) -> PortalResult<Option<Credential>> {
        let cred = sqlx::query_as::<_, Credential>(
            "SELECT id, username, password_hash, user_id, role_id, failed_attempts, lock_reason
             FROM credentials WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(cred)
    }

    /// Fetch a profile by user id
    pub async fn get_profile(&self, user_id: i64) -> PortalResult<UserProfile> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT id, first_name, last_name, phone, email, address, city, zip_code, created_at
             FROM users WHERE id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| PortalError::NotFound("User not found".to_string()))?;

        Ok(profile)
    }

    /// Update profile fields for the target row
    pub async fn update_profile(&self, req: &UpdateProfileRequest) -> PortalResult<()> {
        validate_email(&req.email)?;

        let result = sqlx::query(
            "UPDATE users
             SET email = ?1, first_name = ?2, last_name = ?3, phone = ?4,
                 address = ?5, city = ?6, zip_code = ?7
             WHERE id = ?8",
        )
        .bind(&req.email)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.phone)
        .bind(&req.address)
        .bind(&req.city)
        .bind(&req.zip_code)
        .bind(req.id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PortalError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    /// List every user (admin overview)
    pub async fn list_users(&self) -> PortalResult<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, first_name, last_name FROM users ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    async fn username_exists(&self, username: &str) -> PortalResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credentials WHERE username = ?1")
            .bind(username)
            .fetch_one(&self.db)
            .await?;

        Ok(count > 0)
    }
}

/// Shape check for email addresses: local part, one '@', dotted domain
fn validate_email(email: &str) -> PortalResult<()> {
    let mut parts = email.split('@');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(PortalError::Validation("Invalid email format".to_string()))
    }
}
