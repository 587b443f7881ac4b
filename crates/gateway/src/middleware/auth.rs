//! Authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{UserRole, BEARER_TOKEN_PREFIX};
use marketplace_service_lib::{Actor, Claims};

use crate::state::AppState;

/// Current authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    /// Check if user has admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Identity passed to services for ownership checks.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: UserRole::from(claims.role),
        }
    }
}

/// Check if user has admin privileges.
pub fn require_admin(user: &CurrentUser) -> AppResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Authentication middleware that validates JWT tokens.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request)?;
    let claims = state.services.auth.verify_token(token)?;

    request.extensions_mut().insert(CurrentUser::from(claims));

    Ok(next.run(request).await)
}

/// Extract bearer token from Authorization header.
fn extract_token(request: &Request<Body>) -> AppResult<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(header: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let request = request_with(Some("Bearer abc.def"));
        assert_eq!(extract_token(&request).unwrap(), "abc.def");
    }

    #[test]
    fn test_missing_or_malformed_header_unauthorized() {
        assert!(matches!(
            extract_token(&request_with(None)),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            extract_token(&request_with(Some("Basic abc"))),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            extract_token(&request_with(Some("Bearer "))),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_claims_role_maps_to_user_role() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "admin@example.com".to_string(),
            role: "admin".to_string(),
            exp: 0,
            iat: 0,
        };
        let user = CurrentUser::from(claims);
        assert!(user.is_admin());
        assert!(require_admin(&user).is_ok());
        assert!(user.actor().is_admin());
    }
}
