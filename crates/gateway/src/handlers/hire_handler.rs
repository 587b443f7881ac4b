//! Hire handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::AppResult;
use domain::{Hire, HireChanges, HireStatus};
use marketplace_service_lib::CreateHire;

use crate::extractors::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Hire request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateHireRequest {
    /// Service being hired
    pub service_id: Uuid,
    pub scheduled_for: Option<DateTime<Utc>>,
    #[validate(length(max = 2000, message = "Notes are too long"))]
    pub notes: Option<String>,
}

/// Status transition and/or detail changes
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateHireRequest {
    pub status: Option<HireStatus>,
    pub scheduled_for: Option<DateTime<Utc>>,
    #[validate(length(max = 2000, message = "Notes are too long"))]
    pub notes: Option<String>,
}

/// Create hire routes (all require authentication)
pub fn hire_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_hires).post(create_hire))
        .route("/:id", get(get_hire).put(update_hire).delete(delete_hire))
}

/// Hires where the caller is client or provider (admin: all)
#[utoipa::path(
    get,
    path = "/hires",
    tag = "Hires",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Visible hires, newest first", body = Vec<Hire>))
)]
pub async fn list_hires(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Hire>>> {
    Ok(Json(state.services.hires.list_hires(current_user.actor()).await?))
}

/// Get a hire (party or admin)
#[utoipa::path(
    get,
    path = "/hires/{id}",
    tag = "Hires",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Hire ID")),
    responses(
        (status = 200, description = "Hire", body = Hire),
        (status = 403, description = "Not a party to this hire"),
        (status = 404, description = "Hire not found")
    )
)]
pub async fn get_hire(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Hire>> {
    Ok(Json(state.services.hires.get_hire(current_user.actor(), id).await?))
}

/// Hire a service
#[utoipa::path(
    post,
    path = "/hires",
    tag = "Hires",
    security(("bearer_auth" = [])),
    request_body = CreateHireRequest,
    responses(
        (status = 201, description = "Hire created as pending", body = Hire),
        (status = 400, description = "Cannot hire your own service"),
        (status = 404, description = "Service not found")
    )
)]
pub async fn create_hire(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateHireRequest>,
) -> AppResult<(StatusCode, Json<Hire>)> {
    let input = CreateHire {
        service_id: payload.service_id,
        scheduled_for: payload.scheduled_for,
        notes: payload.notes,
    };
    let hire = state
        .services
        .hires
        .create_hire(current_user.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(hire)))
}

/// Move a hire through its lifecycle or edit its details
#[utoipa::path(
    put,
    path = "/hires/{id}",
    tag = "Hires",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Hire ID")),
    request_body = UpdateHireRequest,
    responses(
        (status = 200, description = "Hire updated", body = Hire),
        (status = 400, description = "Illegal status transition"),
        (status = 403, description = "Not allowed to make this change"),
        (status = 404, description = "Hire not found")
    )
)]
pub async fn update_hire(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateHireRequest>,
) -> AppResult<Json<Hire>> {
    let changes = HireChanges {
        status: payload.status,
        scheduled_for: payload.scheduled_for,
        notes: payload.notes,
    };
    let hire = state
        .services
        .hires
        .update_hire(current_user.actor(), id, changes)
        .await?;
    Ok(Json(hire))
}

/// Delete a hire and its payments (client or admin)
#[utoipa::path(
    delete,
    path = "/hires/{id}",
    tag = "Hires",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Hire ID")),
    responses(
        (status = 204, description = "Hire deleted"),
        (status = 403, description = "Only the client or an admin may delete"),
        (status = 404, description = "Hire not found")
    )
)]
pub async fn delete_hire(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .services
        .hires
        .delete_hire(current_user.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
