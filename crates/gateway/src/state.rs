//! Application state for dependency injection.

use std::sync::Arc;

use axum::extract::FromRef;
use marketplace_service_lib::{Database, Services};
use notification_service_lib::NotificationHub;

use crate::config::GatewayConfig;
use crate::middleware::Cache;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub database: Arc<Database>,
    pub cache: Arc<Cache>,
    pub notifications: NotificationHub,
    pub config: GatewayConfig,
}

impl AppState {
    /// Wire services on top of an open database and cache.
    pub fn new(
        database: Arc<Database>,
        cache: Arc<Cache>,
        notifications: NotificationHub,
        config: GatewayConfig,
    ) -> Self {
        let services = Services::from_connection(
            database.get_connection(),
            config.jwt.clone(),
            notifications.clone(),
        );
        Self {
            services,
            database,
            cache,
            notifications,
            config,
        }
    }
}

impl FromRef<AppState> for NotificationHub {
    fn from_ref(state: &AppState) -> Self {
        state.notifications.clone()
    }
}
