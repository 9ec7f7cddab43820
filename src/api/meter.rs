/// /meters/* endpoints
use crate::{
    api::middleware,
    auth::{guard, Role},
    context::AppContext,
    db::models::Meter,
    error::PortalResult,
    meter::RegisterMeterRequest,
};
use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};

/// Build meter routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/meters/list", get(list_meters))
        .route("/meters/register", post(register_meter))
}

/// List meters: admins see the whole registry, everyone else their own
async fn list_meters(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> PortalResult<Json<Vec<Meter>>> {
    let claims = middleware::require_auth(&ctx, &headers)?;

    let meters = if claims.role_id == Role::Admin.as_id() {
        ctx.meter_manager.list_all().await?
    } else {
        ctx.meter_manager.list_for_owner(claims.user_id).await?
    };

    Ok(Json(meters))
}

/// Register a meter for an owner; elevated callers only
async fn register_meter(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<RegisterMeterRequest>,
) -> PortalResult<Json<Meter>> {
    let claims = middleware::require_admin(&ctx, &headers)?;

    // An admin may register on behalf of another acting user
    let created_by = guard::resolve_actor_id(&claims, req.actor_id);

    let meter = ctx
        .meter_manager
        .register(&req.serial, req.owner_id, created_by)
        .await?;

    Ok(Json(meter))
}
