//! Business services.
//!
//! Each service is a trait for injection plus a `*Manager` (or `Authenticator`)
//! implementation backed by repositories. Services that tell users about
//! changes receive a [`NotificationHub`](notification_service_lib::NotificationHub).

mod access;
mod auth_service;
mod category_service;
mod container;
mod hire_service;
mod listing_service;
mod payment_service;
mod provider_service;
mod user_service;

pub use access::Actor;
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use category_service::{CategoryManager, CategoryService};
pub use container::Services;
pub use hire_service::{CreateHire, HireManager, HireService};
pub use listing_service::{CategoryRef, CreateListing, ListingManager, ListingService};
pub use payment_service::{CreatePayment, PaymentManager, PaymentService};
pub use provider_service::{ProviderManager, ProviderService};
pub use user_service::{UserManager, UserService};

#[cfg(test)]
mod tests;
