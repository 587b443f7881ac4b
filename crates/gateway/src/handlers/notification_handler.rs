//! The caller's notification queue.
//!
//! Routes only need the [`NotificationHub`] and a [`CurrentUser`] extension,
//! so they can be mounted on any state that exposes a hub.

use axum::{
    extract::{Extension, FromRef, Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get},
    Router,
};

use notification_service_lib::{Notification, NotificationHub, NotificationId};

use crate::middleware::CurrentUser;

/// Create notification routes (all require authentication)
pub fn notification_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    NotificationHub: FromRef<S>,
{
    Router::new()
        .route("/", get(list_notifications).delete(clear_notifications))
        .route("/:id", delete(dismiss_notification))
}

/// Active notifications in the order they were raised
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active notifications, oldest first", body = Vec<Notification>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_notifications(
    Extension(current_user): Extension<CurrentUser>,
    State(hub): State<NotificationHub>,
) -> Json<Vec<Notification>> {
    Json(hub.snapshot(current_user.id))
}

/// Dismiss one notification. Unknown ids are ignored.
#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = u64, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Notification dismissed or already gone"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn dismiss_notification(
    Extension(current_user): Extension<CurrentUser>,
    State(hub): State<NotificationHub>,
    Path(id): Path<u64>,
) -> StatusCode {
    let removed = hub.dismiss(current_user.id, NotificationId(id));
    tracing::debug!(user_id = %current_user.id, notification_id = id, removed, "Dismiss requested");
    StatusCode::NO_CONTENT
}

/// Dismiss every active notification
#[utoipa::path(
    delete,
    path = "/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "All notifications dismissed"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn clear_notifications(
    Extension(current_user): Extension<CurrentUser>,
    State(hub): State<NotificationHub>,
) -> StatusCode {
    hub.clear(current_user.id);
    StatusCode::NO_CONTENT
}
