//! HTTP request handlers, one router per resource.

pub mod auth_handler;
pub mod category_handler;
pub mod health_handler;
pub mod hire_handler;
pub mod notification_handler;
pub mod payment_handler;
pub mod provider_handler;
pub mod service_handler;
pub mod user_handler;

pub use auth_handler::{auth_routes, refresh_routes};
pub use category_handler::{category_admin_routes, category_routes};
pub use health_handler::{health_routes, root};
pub use hire_handler::hire_routes;
pub use notification_handler::notification_routes;
pub use payment_handler::payment_routes;
pub use provider_handler::{provider_protected_routes, provider_routes};
pub use service_handler::{service_protected_routes, service_routes};
pub use user_handler::user_routes;
