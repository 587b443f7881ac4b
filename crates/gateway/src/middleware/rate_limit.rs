//! Rate limiting middleware.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use common::RateLimitConfig;

use crate::state::AppState;

/// Rate limit middleware for general endpoints.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let limit = state.config.rate_limit;
    rate_limit_internal(state, connect_info, request, next, limit).await
}

/// Rate limit middleware for auth endpoints (stricter).
pub async fn rate_limit_auth_middleware(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let limit = state.config.auth_rate_limit;
    rate_limit_internal(state, connect_info, request, next, limit).await
}

async fn rate_limit_internal(
    state: AppState,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
    next: Next,
    limit: RateLimitConfig,
) -> Response {
    let ip = client_ip(request.headers(), connect_info);
    let identifier = format!("{}:{}", request.uri().path(), ip);

    let count = match state
        .cache
        .check_rate_limit(&identifier, limit.max_requests, limit.window_seconds)
        .await
    {
        Ok((count, true)) => count,
        Ok((_, false)) => return rate_limit_exceeded_response(limit),
        Err(e) => {
            // Fail closed
            tracing::error!(error = %e, "Rate limiter unavailable, rejecting request");
            return rate_limit_exceeded_response(limit);
        }
    };

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit.max_requests));
    headers.insert(
        "X-RateLimit-Remaining",
        HeaderValue::from(limit.max_requests.saturating_sub(count)),
    );

    response
}

fn client_ip(headers: &HeaderMap, connect_info: Option<ConnectInfo<SocketAddr>>) -> String {
    if let Some(forwarded) = headers
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return forwarded.to_string();
    }

    if let Some(real_ip) = headers.get("X-Real-IP").and_then(|h| h.to_str().ok()) {
        return real_ip.to_string();
    }

    connect_info
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn rate_limit_exceeded_response(limit: RateLimitConfig) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        "Too many requests. Please try again later.",
    )
        .into_response();

    let headers = response.headers_mut();
    headers.insert("Retry-After", HeaderValue::from(limit.window_seconds));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
    headers.insert("X-RateLimit-Limit", HeaderValue::from(limit.max_requests));

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("X-Real-IP", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers, None), "203.0.113.7");
    }

    #[test]
    fn test_falls_back_to_socket_address() {
        let addr: SocketAddr = "192.0.2.1:4000".parse().unwrap();
        assert_eq!(client_ip(&HeaderMap::new(), Some(ConnectInfo(addr))), "192.0.2.1");
        assert_eq!(client_ip(&HeaderMap::new(), None), "unknown");
    }

    #[test]
    fn test_exceeded_response_headers() {
        let response = rate_limit_exceeded_response(RateLimitConfig {
            max_requests: 10,
            window_seconds: 60,
        });
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["Retry-After"], "60");
        assert_eq!(response.headers()["X-RateLimit-Remaining"], "0");
    }
}
