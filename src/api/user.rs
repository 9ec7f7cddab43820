/// /user/* endpoints: profile retrieval and updates
use crate::{
    account::{UpdateProfileRequest, UserSummary},
    api::middleware,
    auth::{guard, AccessRequirement},
    context::AppContext,
    db::models::UserProfile,
    error::{PortalError, PortalResult},
};
use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};

/// Build user routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/user/profile", get(get_profile))
        .route("/user/update", post(update_profile))
        .route("/user/all", get(list_users))
}

/// Retrieve the caller's own profile
async fn get_profile(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> PortalResult<Json<UserProfile>> {
    let claims = middleware::require_auth(&ctx, &headers)?;

    let profile = ctx.account_manager.get_profile(claims.user_id).await?;

    Ok(Json(profile))
}

/// Update a profile; self-or-elevated on the target row
async fn update_profile(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> PortalResult<Json<serde_json::Value>> {
    let claims = middleware::require_auth(&ctx, &headers)?;

    if !guard::permits(&claims, AccessRequirement::SelfOrElevated { owner_id: req.id }) {
        return Err(PortalError::Authorization(
            "Cannot update another user's profile".to_string(),
        ));
    }

    ctx.account_manager.update_profile(&req).await?;

    Ok(Json(serde_json::json!({
        "message": "User updated successfully"
    })))
}

/// List all users; elevated callers only
async fn list_users(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> PortalResult<Json<Vec<UserSummary>>> {
    middleware::require_admin(&ctx, &headers)?;

    let users = ctx.account_manager.list_users().await?;

    Ok(Json(users))
}
