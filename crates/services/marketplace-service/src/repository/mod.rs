//! Repository layer for data access.

pub mod entities;
mod category_repository;
mod hire_repository;
mod listing_repository;
mod payment_repository;
mod provider_repository;
mod user_repository;

pub use category_repository::{CategoryRepository, CategoryStore};
pub use hire_repository::{HireRepository, HireStore};
pub use listing_repository::{ListingRepository, ListingStore};
pub use payment_repository::{PaymentRepository, PaymentStore};
pub use provider_repository::{ProviderRepository, ProviderStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use category_repository::MockCategoryRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use hire_repository::MockHireRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use listing_repository::MockListingRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_repository::MockPaymentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use provider_repository::MockProviderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;

use common::AppError;
use domain::DomainError;
use sea_orm::{DbErr, SqlErr};

/// Map a write error, turning constraint violations into client errors.
pub(crate) fn write_error(err: DbErr, entity: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(entity),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::validation(format!("{} references a record that does not exist", entity))
        }
        _ => AppError::from(err),
    }
}

/// A stored row that no longer parses into its domain type.
pub(crate) fn corrupt_row(err: DomainError) -> AppError {
    AppError::internal(format!("Corrupt row: {}", err))
}
