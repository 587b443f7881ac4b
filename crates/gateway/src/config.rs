//! Gateway configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use common::{
    AppError, AppResult, CacheConfig, DatabaseConfig, JwtConfig, NotificationConfig,
    RateLimitConfig, ServerConfig,
};
use domain::{DEFAULT_JWT_EXPIRATION_HOURS, MIN_JWT_SECRET_LENGTH};

/// Secret used in debug builds when `JWT_SECRET` is unset.
const DEV_JWT_SECRET: &str = "dev-secret-key-minimum-32-chars!!";

/// Gateway configuration.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub jwt: JwtConfig,
    /// Limit for general endpoints
    pub rate_limit: RateLimitConfig,
    /// Stricter limit for `/auth` endpoints
    pub auth_rate_limit: RateLimitConfig,
    pub notifications: NotificationConfig,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails when `JWT_SECRET` is missing in a release build or shorter than
    /// the minimum length.
    pub fn from_env() -> AppResult<Self> {
        let server_defaults = ServerConfig::default();
        let database_defaults = DatabaseConfig::default();
        let cache_defaults = CacheConfig::default();
        let auth_defaults = RateLimitConfig {
            max_requests: 10,
            window_seconds: 60,
        };
        let general_defaults = RateLimitConfig::default();

        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(server_defaults.host),
                port: parse_var("SERVER_PORT", server_defaults.port),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(database_defaults.url),
                max_connections: parse_var(
                    "DATABASE_MAX_CONNECTIONS",
                    database_defaults.max_connections,
                ),
                min_connections: parse_var(
                    "DATABASE_MIN_CONNECTIONS",
                    database_defaults.min_connections,
                ),
            },
            cache: CacheConfig {
                url: env::var("REDIS_URL").unwrap_or(cache_defaults.url),
                default_ttl_seconds: parse_var(
                    "CACHE_TTL_SECONDS",
                    cache_defaults.default_ttl_seconds,
                ),
            },
            jwt: JwtConfig {
                secret: jwt_secret(env::var("JWT_SECRET").ok())?,
                expiration_hours: parse_var("JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS),
            },
            rate_limit: RateLimitConfig {
                max_requests: parse_var("RATE_LIMIT_REQUESTS", general_defaults.max_requests),
                window_seconds: parse_var(
                    "RATE_LIMIT_WINDOW_SECONDS",
                    general_defaults.window_seconds,
                ),
            },
            auth_rate_limit: RateLimitConfig {
                max_requests: parse_var("RATE_LIMIT_AUTH_REQUESTS", auth_defaults.max_requests),
                window_seconds: parse_var(
                    "RATE_LIMIT_AUTH_WINDOW_SECONDS",
                    auth_defaults.window_seconds,
                ),
            },
            notifications: NotificationConfig {
                ttl_ms: parse_var("NOTIFICATION_TTL_MS", NotificationConfig::default().ttl_ms),
            },
        })
    }

    /// How long a notification stays visible.
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notifications.ttl_ms)
    }
}

/// Read and parse a variable, falling back to `default` when unset or malformed.
fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(variable = name, value = %raw, "Ignoring unparsable value");
            default
        }),
        Err(_) => default,
    }
}

fn jwt_secret(value: Option<String>) -> AppResult<String> {
    let secret = match value {
        Some(secret) => secret,
        None if cfg!(debug_assertions) => {
            tracing::warn!("JWT_SECRET not set, using insecure default for development");
            DEV_JWT_SECRET.to_string()
        }
        None => {
            return Err(AppError::internal(
                "JWT_SECRET environment variable must be set in production",
            ))
        }
    };

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(AppError::internal(format!(
            "JWT_SECRET must be at least {} characters long",
            MIN_JWT_SECRET_LENGTH
        )));
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_rejected() {
        assert!(jwt_secret(Some("short".to_string())).is_err());
    }

    #[test]
    fn test_long_secret_accepted() {
        let secret = "x".repeat(MIN_JWT_SECRET_LENGTH);
        assert_eq!(jwt_secret(Some(secret.clone())).unwrap(), secret);
    }

    #[test]
    fn test_dev_default_in_debug_builds() {
        if cfg!(debug_assertions) {
            assert_eq!(jwt_secret(None).unwrap(), DEV_JWT_SECRET);
        }
    }

    #[test]
    fn test_notification_ttl_default() {
        let config = GatewayConfig::default();
        assert_eq!(config.notification_ttl(), Duration::from_millis(4000));
        assert_eq!(config.notification_ttl(), notification_service_lib::DEFAULT_TTL);
    }
}
