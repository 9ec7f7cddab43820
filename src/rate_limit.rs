/// Request rate limiting
use crate::{
    config::RateLimitConfig,
    error::{PortalError, PortalResult},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use std::{num::NonZeroU32, sync::Arc};

/// In-process limiter with a strict tier for credential endpoints and a
/// general tier for everything else
#[derive(Clone)]
pub struct RateLimiter {
    enabled: bool,
    credential: Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    general: Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let credential_quota = Quota::per_minute(
            NonZeroU32::new(config.credential_requests_per_minute)
                .unwrap_or(NonZeroU32::new(10).unwrap()),
        );

        let general_quota = Quota::per_minute(
            NonZeroU32::new(config.general_requests_per_minute)
                .unwrap_or(NonZeroU32::new(240).unwrap()),
        );

        Self {
            enabled: config.enabled,
            credential: Arc::new(GovernorLimiter::direct(credential_quota)),
            general: Arc::new(GovernorLimiter::direct(general_quota)),
        }
    }

    /// Check the strict quota guarding login and signup
    pub fn check_credential(&self) -> PortalResult<()> {
        if !self.enabled {
            return Ok(());
        }
        match self.credential.check() {
            Ok(_) => Ok(()),
            Err(_) => Err(PortalError::RateLimitExceeded {
                retry_after: std::time::Duration::from_secs(60),
            }),
        }
    }

    /// Check the general quota
    pub fn check_general(&self) -> PortalResult<()> {
        if !self.enabled {
            return Ok(());
        }
        match self.general.check() {
            Ok(_) => Ok(()),
            Err(_) => Err(PortalError::RateLimitExceeded {
                retry_after: std::time::Duration::from_secs(1),
            }),
        }
    }
}

/// Rate limiting middleware
///
/// Credential endpoints take the strict quota; everything else shares the
/// general one.
pub async fn rate_limit_middleware(
    State(ctx): State<crate::context::AppContext>,
    request: Request,
    next: Next,
) -> Result<Response, PortalError> {
    let path = request.uri().path();
    let is_credential_endpoint = path == "/auth/login" || path == "/auth/signup";

    if is_credential_endpoint {
        ctx.rate_limiter.check_credential()?;
    } else {
        ctx.rate_limiter.check_general()?;
    }

    Ok(next.run(request).await)
}
