//! Category handlers. Reads are public and served from the Redis cache.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::{Category, CategoryChanges};

use crate::extractors::ValidatedJson;
use crate::middleware::{require_admin, CurrentUser};
use crate::state::AppState;

/// Category creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    #[schema(example = "Plumbing")]
    pub name: String,
    #[schema(example = "Pipes, leaks and installations")]
    pub description: Option<String>,
}

/// Partial category update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 120, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Public category routes
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/:id", get(get_category))
}

/// Admin-only category routes
pub fn category_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_category))
        .route("/:id", put(update_category).delete(delete_category))
}

/// Drop the cached list after a write. Failures are only logged.
async fn invalidate(state: &AppState) {
    if let Err(e) = state.cache.invalidate_categories().await {
        tracing::warn!(error = %e, "Failed to invalidate category cache");
    }
}

/// List categories
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Categories",
    responses((status = 200, description = "All categories by name", body = Vec<Category>))
)]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    match state.cache.get_categories().await {
        Ok(Some(categories)) => return Ok(Json(categories)),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Category cache read failed"),
    }

    let categories = state.services.categories.list_categories().await?;

    if let Err(e) = state.cache.set_categories(&categories).await {
        tracing::warn!(error = %e, "Category cache write failed");
    }
    Ok(Json(categories))
}

/// Get a category
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    Ok(Json(state.services.categories.get_category(id).await?))
}

/// Create a category (admin only)
#[utoipa::path(
    post,
    path = "/categories",
    tag = "Categories",
    security(("bearer_auth" = [])),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 409, description = "Category name already taken")
    )
)]
pub async fn create_category(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    require_admin(&current_user)?;
    let category = state
        .services
        .categories
        .create_category(payload.name, payload.description)
        .await?;
    invalidate(&state).await;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category (admin only)
#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "Categories",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category name already taken")
    )
)]
pub async fn update_category(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateCategoryRequest>,
) -> AppResult<Json<Category>> {
    require_admin(&current_user)?;
    let changes = CategoryChanges {
        name: payload.name,
        description: payload.description,
    };
    let category = state.services.categories.update_category(id, changes).await?;
    invalidate(&state).await;
    Ok(Json(category))
}

/// Delete a category and its services (admin only)
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "Categories",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_admin(&current_user)?;
    state.services.categories.delete_category(id).await?;
    invalidate(&state).await;
    Ok(StatusCode::NO_CONTENT)
}
