//! Health check and welcome handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub services: ServiceStatus,
}

/// Status of each backing service.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStatus {
    pub database: ServiceHealth,
    pub redis: ServiceHealth,
}

/// Service health with optional error message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                status: "healthy".to_string(),
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy".to_string(),
                error: Some(e.to_string()),
            },
        }
    }

    fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

/// Create health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Welcome message
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Welcome message", body = String))
)]
pub async fn root() -> &'static str {
    "Welcome to the services marketplace API"
}

/// Health check - verifies database and Redis connectivity
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "All backing services reachable", body = HealthResponse),
        (status = 503, description = "At least one backing service is down", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let database = ServiceHealth::from_result(state.database.ping().await);
    let redis = ServiceHealth::from_result(state.cache.ping().await);

    let all_healthy = database.is_healthy() && redis.is_healthy();
    if !all_healthy {
        tracing::warn!(
            database = %database.status,
            redis = %redis.status,
            "Health check degraded"
        );
    }

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        services: ServiceStatus { database, redis },
    };

    let status = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_health_from_result() {
        assert!(ServiceHealth::from_result(Ok::<(), String>(())).is_healthy());
        let down = ServiceHealth::from_result(Err("connection refused"));
        assert_eq!(down.status, "unhealthy");
        assert_eq!(down.error.as_deref(), Some("connection refused"));
    }
}
