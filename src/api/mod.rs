/// API routes and handlers
pub mod auth;
pub mod consumption;
pub mod meter;
pub mod middleware;
pub mod user;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(auth::routes())
        .merge(user::routes())
        .merge(meter::routes())
        .merge(consumption::routes())
}
