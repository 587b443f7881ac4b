//! Domain layer - Core marketplace entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Entities here are shared by the marketplace service and the HTTP gateway.

pub mod category;
pub mod constants;
pub mod error;
pub mod hire;
pub mod listing;
pub mod password;
pub mod payment;
pub mod provider;
pub mod user;
pub mod whatsapp;

pub use category::{normalize_category_name, Category, CategoryChanges};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use hire::{Hire, HireChanges, HireStatus, NewHire};
pub use listing::{
    validate_price, ListingChanges, ListingQuery, ListingSort, NewListing, ServiceListing,
};
pub use password::{Password, DUMMY_PASSWORD_HASH};
pub use payment::{
    format_amount, normalize_currency, NewPayment, Payment, PaymentChanges, PaymentMethod,
    PaymentStatus,
};
pub use provider::{NewProvider, Provider, ProviderChanges};
pub use user::{NewUser, User, UserChanges, UserResponse, UserRole};
pub use whatsapp::WhatsAppLink;
