//! Marketplace HTTP gateway.
//!
//! Serves the marketplace services over a JSON REST API: authentication,
//! users, categories, providers, service listings, hires, payments and the
//! caller's notification queue.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;

use common::{AppError, AppResult};
use marketplace_service_lib::Database;
use notification_service_lib::NotificationHub;

use crate::config::GatewayConfig;
use crate::middleware::Cache;
use crate::routes::create_router;
use crate::state::AppState;

/// Connect to Postgres and Redis, then serve HTTP until the process stops.
pub async fn run_server(host: &str, port: u16, config: GatewayConfig) -> AppResult<()> {
    let database = Arc::new(Database::connect(&config.database).await?);
    info!("Database connected");

    let cache = Arc::new(Cache::connect(&config.cache).await?);
    info!("Redis cache connected");

    let notifications = NotificationHub::new(config.notification_ttl());
    let state = AppState::new(database, cache, notifications, config);

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| AppError::bad_request(format!("Invalid listen address: {}", e)))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;
    info!("Marketplace listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
