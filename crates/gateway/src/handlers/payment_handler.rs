//! Payment handlers and WhatsApp follow-up links.

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

use common::AppResult;
use domain::{Payment, PaymentChanges, PaymentMethod, PaymentStatus, WhatsAppLink};
use marketplace_service_lib::CreatePayment;

use crate::extractors::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Payment request. Amount defaults to the service price, currency to USD.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentRequest {
    pub hire_id: Uuid,
    #[validate(range(min = 0, message = "Amount cannot be negative"))]
    #[schema(example = 4500)]
    pub amount_cents: Option<i64>,
    #[validate(length(equal = 3, message = "Currency must be a three-letter ISO code"))]
    #[schema(example = "USD")]
    pub currency: Option<String>,
    pub method: PaymentMethod,
    #[validate(length(max = 200, message = "Reference is too long"))]
    pub reference: Option<String>,
}

/// Status transition and/or reference change
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentRequest {
    pub status: Option<PaymentStatus>,
    #[validate(length(max = 200, message = "Reference is too long"))]
    pub reference: Option<String>,
}

/// Create payment routes (all require authentication)
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(create_payment))
        .route(
            "/:id",
            get(get_payment).put(update_payment).delete(delete_payment),
        )
        .route("/:id/whatsapp", get(whatsapp_link))
}

/// Payments visible to the caller (admin: all)
#[utoipa::path(
    get,
    path = "/payments",
    tag = "Payments",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Visible payments, newest first", body = Vec<Payment>))
)]
pub async fn list_payments(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Payment>>> {
    Ok(Json(
        state.services.payments.list_payments(current_user.actor()).await?,
    ))
}

/// Get a payment (party to its hire or admin)
#[utoipa::path(
    get,
    path = "/payments/{id}",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment", body = Payment),
        (status = 403, description = "Not a party to the hire"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn get_payment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Payment>> {
    Ok(Json(
        state
            .services
            .payments
            .get_payment(current_user.actor(), id)
            .await?,
    ))
}

/// Start a payment for one of the caller's hires
#[utoipa::path(
    post,
    path = "/payments",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment created as pending", body = Payment),
        (status = 400, description = "Validation error or cancelled hire"),
        (status = 403, description = "Only the client of the hire may pay"),
        (status = 404, description = "Hire not found")
    )
)]
pub async fn create_payment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePaymentRequest>,
) -> AppResult<(StatusCode, Json<Payment>)> {
    let input = CreatePayment {
        hire_id: payload.hire_id,
        amount_cents: payload.amount_cents,
        currency: payload.currency,
        method: payload.method,
        reference: payload.reference,
    };
    let payment = state
        .services
        .payments
        .create_payment(current_user.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Move a payment through its lifecycle or set its reference
#[utoipa::path(
    put,
    path = "/payments/{id}",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment updated", body = Payment),
        (status = 400, description = "Illegal status transition"),
        (status = 403, description = "Not a party to the hire"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn update_payment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePaymentRequest>,
) -> AppResult<Json<Payment>> {
    let changes = PaymentChanges {
        status: payload.status,
        reference: payload.reference,
    };
    let payment = state
        .services
        .payments
        .update_payment(current_user.actor(), id, changes)
        .await?;
    Ok(Json(payment))
}

/// Delete a payment (admin only)
#[utoipa::path(
    delete,
    path = "/payments/{id}",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn delete_payment(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .services
        .payments
        .delete_payment(current_user.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// WhatsApp deep link to the provider about this payment
#[utoipa::path(
    get,
    path = "/payments/{id}/whatsapp",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Click-to-chat link", body = WhatsAppLink),
        (status = 400, description = "Provider has no phone number"),
        (status = 403, description = "Not a party to the hire"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn whatsapp_link(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WhatsAppLink>> {
    Ok(Json(
        state
            .services
            .payments
            .whatsapp_link(current_user.actor(), id)
            .await?,
    ))
}
