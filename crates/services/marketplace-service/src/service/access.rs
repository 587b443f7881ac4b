//! Caller identity and ownership lookups shared by the services.

use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{Hire, Provider, ServiceListing, UserRole};

use crate::repository::{ListingRepository, ProviderRepository};

/// The authenticated user on whose behalf a service call runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: Uuid, role: UserRole) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Passes for `owner` itself or any admin.
    pub fn require_self_or_admin(&self, owner: Uuid) -> AppResult<()> {
        if self.id == owner || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

/// A hire together with the listing and provider it points at.
#[derive(Debug, Clone)]
pub(crate) struct HireParties {
    pub listing: ServiceListing,
    pub provider: Provider,
}

impl HireParties {
    pub async fn load(
        listings: &dyn ListingRepository,
        providers: &dyn ProviderRepository,
        hire: &Hire,
    ) -> AppResult<Self> {
        let listing = listings
            .find_by_id(hire.service_id)
            .await?
            .ok_or_else(|| AppError::internal(format!("Hire {} has no service", hire.id)))?;
        let provider = providers
            .find_by_id(listing.provider_id)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!("Service {} has no provider", listing.id))
            })?;
        Ok(Self { listing, provider })
    }

    pub fn provider_user_id(&self) -> Uuid {
        self.provider.user_id
    }

    pub fn is_party(&self, hire: &Hire, user_id: Uuid) -> bool {
        hire.client_id == user_id || self.provider.user_id == user_id
    }

    pub fn require_party(&self, hire: &Hire, actor: &Actor) -> AppResult<()> {
        if actor.is_admin() || self.is_party(hire, actor.id) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_or_admin() {
        let me = Uuid::new_v4();
        let user = Actor::new(me, UserRole::User);
        let admin = Actor::new(Uuid::new_v4(), UserRole::Admin);

        assert!(user.require_self_or_admin(me).is_ok());
        assert!(matches!(
            user.require_self_or_admin(Uuid::new_v4()),
            Err(AppError::Forbidden)
        ));
        assert!(admin.require_self_or_admin(me).is_ok());
        assert!(user.require_admin().is_err());
    }
}
