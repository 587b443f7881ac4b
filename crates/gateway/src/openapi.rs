//! OpenAPI documentation.

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::auth_handler::{LoginRequest, RegisterRequest};
use crate::handlers::category_handler::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::handlers::health_handler::{HealthResponse, ServiceHealth, ServiceStatus};
use crate::handlers::hire_handler::{CreateHireRequest, UpdateHireRequest};
use crate::handlers::payment_handler::{CreatePaymentRequest, UpdatePaymentRequest};
use crate::handlers::provider_handler::{CreateProviderRequest, UpdateProviderRequest};
use crate::handlers::service_handler::{CreateServiceRequest, UpdateServiceRequest};
use crate::handlers::user_handler::UpdateUserRequest;
use common::{ListingPage, PaginationMeta};
use domain::{
    Category, Hire, HireStatus, ListingSort, Payment, PaymentMethod, PaymentStatus, Provider,
    ServiceListing, UserResponse, WhatsAppLink,
};
use marketplace_service_lib::TokenResponse;
use notification_service_lib::{Notification, NotificationId, Severity};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::root,
        crate::handlers::health_handler::health_check,
        crate::handlers::auth_handler::register,
        crate::handlers::auth_handler::login,
        crate::handlers::auth_handler::refresh,
        crate::handlers::user_handler::get_current_user,
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::update_user,
        crate::handlers::user_handler::delete_user,
        crate::handlers::category_handler::list_categories,
        crate::handlers::category_handler::get_category,
        crate::handlers::category_handler::create_category,
        crate::handlers::category_handler::update_category,
        crate::handlers::category_handler::delete_category,
        crate::handlers::provider_handler::list_providers,
        crate::handlers::provider_handler::get_provider,
        crate::handlers::provider_handler::create_provider,
        crate::handlers::provider_handler::update_provider,
        crate::handlers::provider_handler::delete_provider,
        crate::handlers::service_handler::list_services,
        crate::handlers::service_handler::get_service,
        crate::handlers::service_handler::create_service,
        crate::handlers::service_handler::update_service,
        crate::handlers::service_handler::delete_service,
        crate::handlers::hire_handler::list_hires,
        crate::handlers::hire_handler::get_hire,
        crate::handlers::hire_handler::create_hire,
        crate::handlers::hire_handler::update_hire,
        crate::handlers::hire_handler::delete_hire,
        crate::handlers::payment_handler::list_payments,
        crate::handlers::payment_handler::get_payment,
        crate::handlers::payment_handler::create_payment,
        crate::handlers::payment_handler::update_payment,
        crate::handlers::payment_handler::delete_payment,
        crate::handlers::payment_handler::whatsapp_link,
        crate::handlers::notification_handler::list_notifications,
        crate::handlers::notification_handler::dismiss_notification,
        crate::handlers::notification_handler::clear_notifications,
    ),
    components(
        schemas(
            HealthResponse,
            ServiceStatus,
            ServiceHealth,
            RegisterRequest,
            LoginRequest,
            TokenResponse,
            UserResponse,
            UpdateUserRequest,
            Category,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            Provider,
            CreateProviderRequest,
            UpdateProviderRequest,
            ServiceListing,
            ListingSort,
            ListingPage,
            PaginationMeta,
            CreateServiceRequest,
            UpdateServiceRequest,
            Hire,
            HireStatus,
            CreateHireRequest,
            UpdateHireRequest,
            Payment,
            PaymentMethod,
            PaymentStatus,
            CreatePaymentRequest,
            UpdatePaymentRequest,
            WhatsAppLink,
            Notification,
            NotificationId,
            Severity,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and welcome endpoints"),
        (name = "Authentication", description = "User authentication endpoints"),
        (name = "Users", description = "User management endpoints"),
        (name = "Categories", description = "Service categories"),
        (name = "Providers", description = "Provider profiles"),
        (name = "Services", description = "Service listings and the gallery"),
        (name = "Hires", description = "Booking services"),
        (name = "Payments", description = "Payments and WhatsApp follow-up"),
        (name = "Notifications", description = "Short-lived messages for the caller"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
