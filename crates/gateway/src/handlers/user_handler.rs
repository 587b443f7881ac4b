//! User handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult};
use domain::{is_valid_role, UserChanges, UserResponse, UserRole};

use crate::extractors::{validate_phone, ValidatedJson};
use crate::middleware::{require_admin, CurrentUser};
use crate::state::AppState;

/// User update request with validation
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(min = 1, max = 120, message = "Name cannot be empty"))]
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    /// New contact phone number
    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "+1 555 010 2030")]
    pub phone: Option<String>,
    /// New role (admin only)
    #[schema(example = "admin")]
    pub role: Option<String>,
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(get_current_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users.get_user(current_user.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of all users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_users(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserResponse>>> {
    require_admin(&current_user)?;
    let users = state.services.users.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get user by ID (own profile or admin)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Can only view own profile unless admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    current_user.actor().require_self_or_admin(id)?;
    let user = state.services.users.get_user(id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Update user (own profile, admin for role changes)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Can only update own profile unless admin"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    current_user.actor().require_self_or_admin(id)?;

    let role = match payload.role {
        Some(role) => {
            require_admin(&current_user)?;
            if !is_valid_role(&role) {
                return Err(AppError::validation("Invalid role. Must be 'user' or 'admin'"));
            }
            Some(UserRole::from(role))
        }
        None => None,
    };

    let changes = UserChanges {
        name: payload.name,
        phone: payload.phone,
        role,
    };
    let user = state.services.users.update_user(id, changes).await?;

    Ok(Json(UserResponse::from(user)))
}

/// Delete user (admin only, cannot delete self)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted along with everything they own"),
        (status = 400, description = "Cannot delete your own account"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_admin(&current_user)?;

    if current_user.id == id {
        return Err(AppError::validation("Cannot delete your own account"));
    }

    state.services.users.delete_user(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
