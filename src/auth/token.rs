/// Bearer token issuance and verification
use crate::error::{PortalError, PortalResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default bearer token lifetime
pub const DEFAULT_TTL_MINUTES: i64 = 20;

/// Identity claims embedded in every token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub role_id: i64,
    pub exp: i64,
}

/// Signs and verifies HS256 bearer tokens.
///
/// Tokens are stateless: validity is determined purely by signature and
/// expiry, with no server-side session row. A token therefore cannot be
/// revoked before it expires; the short TTL bounds the exposure. The
/// signing secret is process-wide configuration, handed in once at
/// construction, which also lets tests run with distinct keys.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service with an explicit lifetime
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Issue a signed token for the given identity
    pub fn issue(&self, user_id: i64, username: &str, role_id: i64) -> PortalResult<String> {
        let expiry = Utc::now() + self.ttl;
        let claims = Claims {
            user_id,
            username: username.to_string(),
            role_id,
            exp: expiry.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| PortalError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Decode a token into its claims.
    ///
    /// Returns `None` for any structural, signature, or expiry failure.
    /// Malformed input is treated identically to an invalid signature so
    /// the caller never sees signature-library internals.
    pub fn decode(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!("Token rejected: {}", e);
                None
            }
        }
    }

    /// True iff the signature is valid and the token has not expired
    pub fn verify(&self, token: &str) -> bool {
        self.decode(token).is_some()
    }
}
