//! Service provider profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's public provider profile. Each user owns at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Provider {
    pub id: Uuid,
    pub user_id: Uuid,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    /// Check whether the given user owns this profile
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Data for creating a provider profile
#[derive(Debug, Clone, Deserialize)]
pub struct NewProvider {
    pub user_id: Uuid,
    pub display_name: String,
    pub bio: Option<String>,
    pub phone: Option<String>,
}

/// Partial provider update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderChanges {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
}
