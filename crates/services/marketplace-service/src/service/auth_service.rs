//! Authentication service - registration, login and JWT handling.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult, JwtConfig};
use domain::{NewUser, Password, User, DUMMY_PASSWORD_HASH, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use notification_service_lib::{NotificationHub, Severity};

use crate::repository::UserRepository;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TokenResponse {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token expiration time in seconds
    pub expires_in: i64,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(
        &self,
        email: String,
        password: String,
        name: String,
        phone: Option<String>,
    ) -> AppResult<User>;

    /// Login and return JWT token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Issue a fresh token for an authenticated user
    async fn refresh_token(&self, user_id: Uuid) -> AppResult<TokenResponse>;
}

pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    notifications: NotificationHub,
    jwt: JwtConfig,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>, notifications: NotificationHub, jwt: JwtConfig) -> Self {
        Self {
            users,
            notifications,
            jwt,
        }
    }

    fn generate_token(&self, user: &User) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.jwt.expiration_hours);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt.secret_bytes()),
        )?;

        Ok(TokenResponse {
            access_token: token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.jwt.expiration_hours * SECONDS_PER_HOUR,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(
        &self,
        email: String,
        password: String,
        name: String,
        phone: Option<String>,
    ) -> AppResult<User> {
        let email = normalize_email(&email);
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation("Name is required"));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&password)?.into_string();

        let user = self
            .users
            .create(NewUser {
                email,
                password_hash,
                name,
                phone,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.notifications.notify(
            user.id,
            format!("Welcome to the marketplace, {}!", user.name),
            Severity::Success,
        );

        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self.users.find_by_email(&normalize_email(&email)).await?;

        // Verify against a dummy hash when the user is missing so both
        // branches cost the same.
        let stored = Password::from_hash(
            user.as_ref()
                .map(|u| u.password_hash.as_str())
                .unwrap_or(DUMMY_PASSWORD_HASH),
        );
        let password_valid = stored.verify(&password);

        match user {
            Some(user) if password_valid => {
                tracing::debug!(user_id = %user.id, "Login succeeded");
                self.generate_token(&user)
            }
            _ => Err(AppError::InvalidCredentials),
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt.secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn refresh_token(&self, user_id: Uuid) -> AppResult<TokenResponse> {
        // Re-read the user so a changed role lands in the new token
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        self.generate_token(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-at-least-32-characters".to_string(),
            expiration_hours: 1,
        }
    }

    fn stored_user(password: &str) -> User {
        let hash = Password::new(password).unwrap().into_string();
        User::new(
            Uuid::new_v4(),
            "ana@example.com".to_string(),
            hash,
            "Ana".to_string(),
        )
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let user = stored_user("password123");
        let user_id = user.id;
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let auth = Authenticator::new(Arc::new(repo), NotificationHub::default(), jwt());
        let token = auth
            .login("ANA@example.com ".to_string(), "password123".to_string())
            .await
            .unwrap();

        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);
        let claims = auth.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, "user");
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let user = stored_user("password123");
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let auth = Authenticator::new(Arc::new(repo), NotificationHub::default(), jwt());
        let result = auth
            .login("ana@example.com".to_string(), "wrong-password".to_string())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_unknown_user_rejected() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let auth = Authenticator::new(Arc::new(repo), NotificationHub::default(), jwt());
        let result = auth
            .login("ghost@example.com".to_string(), "password123".to_string())
            .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let auth = Authenticator::new(
            Arc::new(MockUserRepository::new()),
            NotificationHub::default(),
            jwt(),
        );
        assert!(matches!(auth.verify_token("not.a.jwt"), Err(AppError::Jwt(_))));
    }
}
