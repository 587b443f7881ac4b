//! Hire: a client booking a provider's service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Hire lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HireStatus {
    Pending,
    Accepted,
    Completed,
    Cancelled,
}

impl HireStatus {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            HireStatus::Pending => "pending",
            HireStatus::Accepted => "accepted",
            HireStatus::Completed => "completed",
            HireStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// pending -> accepted -> completed, and pending/accepted -> cancelled.
    /// Setting the current status again is allowed and changes nothing.
    pub fn can_transition_to(&self, next: HireStatus) -> bool {
        use HireStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Accepted, Completed) | (Pending, Cancelled) | (Accepted, Cancelled)
        ) || *self == next
    }

    /// Validate a transition, returning the new status
    pub fn transition(&self, next: HireStatus) -> DomainResult<HireStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::transition("hire", self, next))
        }
    }

    /// Completed and cancelled hires never change again
    pub fn is_final(&self) -> bool {
        matches!(self, HireStatus::Completed | HireStatus::Cancelled)
    }
}

impl std::fmt::Display for HireStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HireStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(HireStatus::Pending),
            "accepted" => Ok(HireStatus::Accepted),
            "completed" => Ok(HireStatus::Completed),
            "cancelled" => Ok(HireStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "Unknown hire status '{}'",
                other
            ))),
        }
    }
}

/// A client's booking of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Hire {
    pub id: Uuid,
    pub service_id: Uuid,
    pub client_id: Uuid,
    pub status: HireStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a hire
#[derive(Debug, Clone)]
pub struct NewHire {
    pub service_id: Uuid,
    pub client_id: Uuid,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Partial hire update
#[derive(Debug, Clone, Default)]
pub struct HireChanges {
    pub status: Option<HireStatus>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(HireStatus::Pending.can_transition_to(HireStatus::Accepted));
        assert!(HireStatus::Accepted.can_transition_to(HireStatus::Completed));
        assert!(HireStatus::Pending.can_transition_to(HireStatus::Cancelled));
        assert!(HireStatus::Accepted.can_transition_to(HireStatus::Cancelled));
    }

    #[test]
    fn test_backward_and_skipping_transitions_rejected() {
        assert!(!HireStatus::Accepted.can_transition_to(HireStatus::Pending));
        assert!(!HireStatus::Pending.can_transition_to(HireStatus::Completed));
        assert!(!HireStatus::Completed.can_transition_to(HireStatus::Cancelled));
        assert!(matches!(
            HireStatus::Cancelled.transition(HireStatus::Accepted),
            Err(DomainError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_same_status_is_noop_transition() {
        assert_eq!(
            HireStatus::Completed.transition(HireStatus::Completed).unwrap(),
            HireStatus::Completed
        );
    }

    #[test]
    fn test_parse_status() {
        assert_eq!("accepted".parse::<HireStatus>().unwrap(), HireStatus::Accepted);
        assert!("done".parse::<HireStatus>().is_err());
    }
}
