/// Gridpoint - Smart-Meter Utility Portal Backend
///
/// Authenticates portal users, manages accounts with brute-force lockout,
/// and records energy-consumption readings for registered meters.

mod account;
mod api;
mod auth;
mod config;
mod consumption;
mod context;
mod db;
mod error;
mod meter;
mod rate_limit;
mod server;

use config::ServerConfig;
use context::AppContext;
use error::PortalResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> PortalResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gridpoint=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
   ____      _     _             _       _
  / ___|_ __(_) __| |_ __   ___ (_)_ __ | |_
 | |  _| '__| |/ _` | '_ \ / _ \| | '_ \| __|
 | |_| | |  | | (_| | |_) | (_) | | | | | |_
  \____|_|  |_|\__,_| .__/ \___/|_|_| |_|\__|
                    |_|

        Smart-Meter Utility Portal v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
