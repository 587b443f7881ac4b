//! Common utilities shared across the marketplace crates.
//!
//! This crate provides:
//! - Unified error handling with HTTP response conversion
//! - Configuration structures
//! - Pagination parameters and envelopes

pub mod config;
pub mod error;
pub mod pagination;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
pub use pagination::{Paginated, PaginationMeta, PaginationParams};
#[cfg(feature = "openapi")]
pub use pagination::ListingPage;
