/// /auth/* endpoints: signup, login, password change, unlock, deletion
use crate::{
    account::{
        ChangePasswordRequest, DeleteAccountRequest, LoginRequest, SignupRequest, TokenResponse,
        UnlockAccountRequest,
    },
    api::middleware,
    auth::{guard, AccessRequirement},
    context::AppContext,
    error::{PortalError, PortalResult},
};
use axum::{
    extract::State,
    http::HeaderMap,
    routing::{delete, post},
    Json, Router,
};

/// Build auth routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/change_password", post(change_password))
        .route("/auth/unlock_account", post(unlock_account))
        .route("/auth/delete_account", delete(delete_account))
}

/// Create a new user account
async fn signup(
    State(ctx): State<AppContext>,
    Json(req): Json<SignupRequest>,
) -> PortalResult<Json<TokenResponse>> {
    let token = ctx.account_manager.signup(req).await?;

    Ok(Json(TokenResponse {
        message: "User created successfully".to_string(),
        token,
    }))
}

/// Authenticate a user and issue a bearer token
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> PortalResult<Json<TokenResponse>> {
    let token = ctx.account_manager.login(&req.username, &req.password).await?;

    Ok(Json(TokenResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

/// Change a password; the caller must present a valid token and the
/// current password of the target account
async fn change_password(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<ChangePasswordRequest>,
) -> PortalResult<Json<serde_json::Value>> {
    middleware::require_auth(&ctx, &headers)?;

    ctx.account_manager
        .change_password(&req.username, &req.old_password, &req.new_password)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Password changed successfully"
    })))
}

/// Reset an account's lockout counter; elevated callers only
async fn unlock_account(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<UnlockAccountRequest>,
) -> PortalResult<Json<serde_json::Value>> {
    let claims = middleware::require_admin(&ctx, &headers)?;

    ctx.account_manager.unlock_account(&req.username).await?;

    tracing::info!(
        admin = %claims.username,
        target = %req.username,
        "Administrative unlock"
    );

    Ok(Json(serde_json::json!({ "message": "User unlocked" })))
}

/// Delete an account; self-or-elevated on the target credential
async fn delete_account(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<DeleteAccountRequest>,
) -> PortalResult<Json<serde_json::Value>> {
    let claims = middleware::require_auth(&ctx, &headers)?;

    let cred = ctx
        .account_manager
        .find_credential(req.username.trim())
        .await?
        .ok_or_else(|| PortalError::NotFound("Account not found".to_string()))?;

    // Ownership is decided by the verified token identity, not the body
    if !guard::permits(
        &claims,
        AccessRequirement::SelfOrElevated {
            owner_id: cred.user_id,
        },
    ) {
        return Err(PortalError::Authorization(
            "Cannot delete another user's account".to_string(),
        ));
    }

    ctx.account_manager.delete_account(&req.username).await?;

    Ok(Json(serde_json::json!({
        "message": "User deleted successfully"
    })))
}
