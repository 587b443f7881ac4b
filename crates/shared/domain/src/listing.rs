//! Service listings offered by providers, and the gallery query over them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// A service a provider offers for hire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ServiceListing {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Price in the smallest currency unit
    pub price_cents: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a listing
#[derive(Debug, Clone)]
pub struct NewListing {
    pub provider_id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub image_url: Option<String>,
}

/// Partial listing update
#[derive(Debug, Clone, Default)]
pub struct ListingChanges {
    pub category_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub image_url: Option<String>,
}

/// Reject negative prices
pub fn validate_price(price_cents: i64) -> DomainResult<i64> {
    if price_cents < 0 {
        return Err(DomainError::validation("Price cannot be negative"));
    }
    Ok(price_cents)
}

/// Gallery sort order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ListingSort {
    #[default]
    Newest,
    Oldest,
    PriceAsc,
    PriceDesc,
    Title,
}

/// Gallery filters. Every filter is optional and they combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub category_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    pub sort: ListingSort,
}

impl ListingQuery {
    /// Blank search terms count as no search; an inverted price range is an error.
    pub fn normalized(mut self) -> DomainResult<Self> {
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if let (Some(min), Some(max)) = (self.min_price_cents, self.max_price_cents) {
            if min > max {
                return Err(DomainError::validation(
                    "min_price cannot be greater than max_price",
                ));
            }
        }
        Ok(self)
    }
}
