//! miniapp REST API server.
//!
//! New event: http://localhost:5000/new-event-form
//! All events: http://localhost:5000/events

use miniapp_api::config::{self, DbConfig};
use miniapp_api::server::{self, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = DbConfig::from_env()?;
    tracing::info!(url = %db.redacted_url(), "opening datastore");
    tracing::info!("Populating database");
    let store = db.open_store()?;
    tracing::info!("Done populating database");

    let app = server::router(Arc::new(AppState { store }));
    let addr = config::listen_addr()?;
    tracing::info!("miniapp API listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;
    Ok(())
}
