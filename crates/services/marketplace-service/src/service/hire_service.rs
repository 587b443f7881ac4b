//! Hire service - booking a listing and moving it through its lifecycle.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{Hire, HireChanges, HireStatus, NewHire};
use notification_service_lib::{NotificationHub, Severity};

use super::access::HireParties;
use super::Actor;
use crate::repository::{HireRepository, ListingRepository, ProviderRepository};

/// Input for hiring a listing.
#[derive(Debug, Clone)]
pub struct CreateHire {
    pub service_id: Uuid,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[async_trait]
pub trait HireService: Send + Sync {
    /// Admins see every hire; others see hires they are a party to
    async fn list_hires(&self, actor: Actor) -> AppResult<Vec<Hire>>;

    async fn get_hire(&self, actor: Actor, id: Uuid) -> AppResult<Hire>;

    async fn create_hire(&self, actor: Actor, input: CreateHire) -> AppResult<Hire>;

    /// Status transition and/or schedule and notes update
    async fn update_hire(&self, actor: Actor, id: Uuid, changes: HireChanges) -> AppResult<Hire>;

    async fn delete_hire(&self, actor: Actor, id: Uuid) -> AppResult<()>;
}

pub struct HireManager {
    hires: Arc<dyn HireRepository>,
    listings: Arc<dyn ListingRepository>,
    providers: Arc<dyn ProviderRepository>,
    notifications: NotificationHub,
}

impl HireManager {
    pub fn new(
        hires: Arc<dyn HireRepository>,
        listings: Arc<dyn ListingRepository>,
        providers: Arc<dyn ProviderRepository>,
        notifications: NotificationHub,
    ) -> Self {
        Self {
            hires,
            listings,
            providers,
            notifications,
        }
    }

    async fn load(&self, id: Uuid) -> AppResult<(Hire, HireParties)> {
        let hire = self.hires.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        let parties =
            HireParties::load(self.listings.as_ref(), self.providers.as_ref(), &hire).await?;
        Ok((hire, parties))
    }
}

/// Only the provider side may accept or complete; either party may cancel.
fn check_status_permission(
    actor: &Actor,
    hire: &Hire,
    parties: &HireParties,
    next: HireStatus,
) -> AppResult<()> {
    if actor.is_admin() || next == hire.status {
        return Ok(());
    }
    match next {
        HireStatus::Accepted | HireStatus::Completed
            if actor.id != parties.provider_user_id() =>
        {
            Err(AppError::Forbidden)
        }
        _ => Ok(()),
    }
}

#[async_trait]
impl HireService for HireManager {
    async fn list_hires(&self, actor: Actor) -> AppResult<Vec<Hire>> {
        if actor.is_admin() {
            self.hires.list_all().await
        } else {
            self.hires.list_for_user(actor.id).await
        }
    }

    async fn get_hire(&self, actor: Actor, id: Uuid) -> AppResult<Hire> {
        let (hire, parties) = self.load(id).await?;
        parties.require_party(&hire, &actor)?;
        Ok(hire)
    }

    async fn create_hire(&self, actor: Actor, input: CreateHire) -> AppResult<Hire> {
        let listing = self
            .listings
            .find_by_id(input.service_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let provider = self
            .providers
            .find_by_id(listing.provider_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if provider.user_id == actor.id {
            return Err(AppError::validation("You cannot hire your own service"));
        }

        let hire = self
            .hires
            .create(NewHire {
                service_id: listing.id,
                client_id: actor.id,
                scheduled_for: input.scheduled_for,
                notes: input.notes,
            })
            .await?;

        tracing::info!(hire_id = %hire.id, service_id = %listing.id, "Hire created");
        self.notifications.notify(
            provider.user_id,
            format!("New hire request for '{}'", listing.title),
            Severity::Info,
        );
        self.notifications.notify(
            actor.id,
            format!("Hire request sent for '{}'", listing.title),
            Severity::Success,
        );

        Ok(hire)
    }

    async fn update_hire(&self, actor: Actor, id: Uuid, mut changes: HireChanges) -> AppResult<Hire> {
        let (hire, parties) = self.load(id).await?;
        parties.require_party(&hire, &actor)?;

        let status_change = match changes.status {
            Some(next) => {
                check_status_permission(&actor, &hire, &parties, next)?;
                let next = hire.status.transition(next)?;
                (next != hire.status).then_some(next)
            }
            None => None,
        };
        changes.status = status_change;

        let updated = self.hires.update(id, changes).await?;

        if let Some(next) = status_change {
            tracing::info!(hire_id = %id, from = %hire.status, to = %next, "Hire status changed");
            let message = format!("Hire for '{}' is now {}", parties.listing.title, next);
            for user_id in [hire.client_id, parties.provider_user_id()] {
                if user_id != actor.id {
                    self.notifications.notify(user_id, message.clone(), Severity::Info);
                }
            }
        }

        Ok(updated)
    }

    async fn delete_hire(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        let hire = self.hires.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        actor.require_self_or_admin(hire.client_id)?;
        self.hires.delete(id).await
    }
}
