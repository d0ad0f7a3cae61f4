mod api;
mod config;
mod db;
mod error;
mod storage;
mod tree;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::AppState;
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logistics_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tokio::fs::create_dir_all(&config.storage_path).await?;

    let db = db::init_database(&config.database_path).await?;
    tracing::info!("Database initialized at {:?}", config.database_path);
    tracing::info!("Storing uploads under {:?}", config.storage_path);

    let addr = config.bind_addr;
    let max_upload_bytes = config.max_upload_bytes;
    let state = Arc::new(AppState::new(config, db));

    let app = api::create_router()
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http());

    tracing::info!("Logistics API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
