//! Service category entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::MAX_NAME_LENGTH;
use crate::error::{DomainError, DomainResult};

/// Category grouping services in the gallery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial category update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Normalize a category name: trimmed, non-empty, bounded.
///
/// Names are the natural key, so every write path goes through here.
pub fn normalize_category_name(name: &str) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("Category name is required"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::validation(format!(
            "Category name must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(trimmed.to_string())
}
