//! Route configuration.

use axum::{middleware, routing::get, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{
    auth_routes, category_admin_routes, category_routes, health_routes, hire_routes,
    notification_routes, payment_routes, provider_protected_routes, provider_routes,
    refresh_routes, root, service_protected_routes, service_routes, user_routes,
};
use crate::middleware::{auth_middleware, rate_limit_auth_middleware, rate_limit_middleware};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// General rate limit only.
fn limited(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        state.clone(),
        rate_limit_middleware,
    ))
}

/// JWT required, then the general rate limit.
fn protected(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    limited(
        router.route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        )),
        state,
    )
}

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let auth = auth_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_auth_middleware,
        ))
        .merge(protected(refresh_routes(), &state));

    Router::new()
        .route("/", get(root))
        // Health check (no auth, no rate limit)
        .nest("/health", health_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/auth", auth)
        .nest("/users", protected(user_routes(), &state))
        // Public reads, authenticated writes
        .nest(
            "/categories",
            limited(category_routes(), &state).merge(protected(category_admin_routes(), &state)),
        )
        .nest(
            "/providers",
            limited(provider_routes(), &state)
                .merge(protected(provider_protected_routes(), &state)),
        )
        .nest(
            "/services",
            limited(service_routes(), &state).merge(protected(service_protected_routes(), &state)),
        )
        .nest("/hires", protected(hire_routes(), &state))
        .nest("/payments", protected(payment_routes(), &state))
        .nest("/notifications", protected(notification_routes(), &state))
        .with_state(state)
}
