/// /consumption/* endpoints
use crate::{
    api::middleware,
    auth::Role,
    consumption::{AddReadingRequest, ReadingRow, UpdateReadingRequest},
    context::AppContext,
    error::PortalResult,
};
use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};

/// Build consumption routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/consumption/list", get(list_readings))
        .route("/consumption/add", post(add_reading))
        .route("/consumption/update", post(update_reading))
}

/// List readings: admins see everything, everyone else readings for
/// meters they own
async fn list_readings(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> PortalResult<Json<Vec<ReadingRow>>> {
    let claims = middleware::require_auth(&ctx, &headers)?;

    let rows = if claims.role_id == Role::Admin.as_id() {
        ctx.consumption_manager.list_all().await?
    } else {
        ctx.consumption_manager.list_for_owner(claims.user_id).await?
    };

    Ok(Json(rows))
}

/// Append a reading
async fn add_reading(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<AddReadingRequest>,
) -> PortalResult<Json<serde_json::Value>> {
    middleware::require_auth(&ctx, &headers)?;

    let id = ctx
        .consumption_manager
        .add(req.meter_id, req.consumption_kwh)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Data successfully added",
        "id": id
    })))
}

/// Amend a reading; elevated callers only
async fn update_reading(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<UpdateReadingRequest>,
) -> PortalResult<Json<serde_json::Value>> {
    middleware::require_admin(&ctx, &headers)?;

    ctx.consumption_manager
        .update(req.id, req.consumption_kwh)
        .await?;

    Ok(Json(serde_json::json!({
        "message": "Data successfully updated"
    })))
}
