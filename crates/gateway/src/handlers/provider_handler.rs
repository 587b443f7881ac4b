//! Provider profile handlers.

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
use domain::{NewProvider, Provider, ProviderChanges};

use crate::extractors::{validate_phone, ValidatedJson};
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Provider profile request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProviderRequest {
    #[validate(length(min = 1, max = 120, message = "Display name is required"))]
    #[schema(example = "Ana's Plumbing")]
    pub display_name: String,
    pub bio: Option<String>,
    /// WhatsApp-reachable number used for payment follow-up
    #[validate(custom(function = "validate_phone"))]
    #[schema(example = "+1 555 010 2030")]
    pub phone: Option<String>,
}

/// Partial provider update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProviderRequest {
    #[validate(length(min = 1, max = 120, message = "Display name cannot be empty"))]
    pub display_name: Option<String>,
    pub bio: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
}

/// Public provider routes
pub fn provider_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_providers))
        .route("/:id", get(get_provider))
}

/// Provider routes that need a logged-in user
pub fn provider_protected_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_provider))
        .route("/:id", put(update_provider).delete(delete_provider))
}

/// List providers
#[utoipa::path(
    get,
    path = "/providers",
    tag = "Providers",
    responses((status = 200, description = "All providers", body = Vec<Provider>))
)]
pub async fn list_providers(State(state): State<AppState>) -> AppResult<Json<Vec<Provider>>> {
    Ok(Json(state.services.providers.list_providers().await?))
}

/// Get a provider
#[utoipa::path(
    get,
    path = "/providers/{id}",
    tag = "Providers",
    params(("id" = Uuid, Path, description = "Provider ID")),
    responses(
        (status = 200, description = "Provider", body = Provider),
        (status = 404, description = "Provider not found")
    )
)]
pub async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Provider>> {
    Ok(Json(state.services.providers.get_provider(id).await?))
}

/// Create the caller's provider profile, or return the existing one
#[utoipa::path(
    post,
    path = "/providers",
    tag = "Providers",
    security(("bearer_auth" = [])),
    request_body = CreateProviderRequest,
    responses(
        (status = 201, description = "Profile created", body = Provider),
        (status = 200, description = "Caller already had a profile", body = Provider),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_provider(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProviderRequest>,
) -> AppResult<(StatusCode, Json<Provider>)> {
    let (provider, created) = state
        .services
        .providers
        .find_or_create_for_user(NewProvider {
            user_id: current_user.id,
            display_name: payload.display_name,
            bio: payload.bio,
            phone: payload.phone,
        })
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(provider)))
}

/// Update a provider profile (owner or admin)
#[utoipa::path(
    put,
    path = "/providers/{id}",
    tag = "Providers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Provider ID")),
    request_body = UpdateProviderRequest,
    responses(
        (status = 200, description = "Profile updated", body = Provider),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Provider not found")
    )
)]
pub async fn update_provider(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProviderRequest>,
) -> AppResult<Json<Provider>> {
    let changes = ProviderChanges {
        display_name: payload.display_name,
        bio: payload.bio,
        phone: payload.phone,
    };
    let provider = state
        .services
        .providers
        .update_provider(current_user.actor(), id, changes)
        .await?;
    Ok(Json(provider))
}

/// Delete a provider profile and its services (owner or admin)
#[utoipa::path(
    delete,
    path = "/providers/{id}",
    tag = "Providers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Provider ID")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Provider not found")
    )
)]
pub async fn delete_provider(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .services
        .providers
        .delete_provider(current_user.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
