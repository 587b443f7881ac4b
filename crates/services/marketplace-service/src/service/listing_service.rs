//! Service listings and the gallery query.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult, Paginated, PaginationParams};
use domain::{
    validate_price, ListingChanges, ListingQuery, NewListing, ServiceListing, MAX_NAME_LENGTH,
};
use notification_service_lib::{NotificationHub, Severity};

use super::{Actor, CategoryService};
use crate::repository::{ListingRepository, ProviderRepository};

/// How a new listing names its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    Id(Uuid),
    /// Created on the fly when no category has this name
    Name(String),
}

/// Input for creating a listing on behalf of the caller's provider profile.
#[derive(Debug, Clone)]
pub struct CreateListing {
    pub category: CategoryRef,
    pub title: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub image_url: Option<String>,
}

#[async_trait]
pub trait ListingService: Send + Sync {
    /// Filtered, sorted, paginated gallery
    async fn search(
        &self,
        query: ListingQuery,
        page: PaginationParams,
    ) -> AppResult<Paginated<ServiceListing>>;

    async fn get_listing(&self, id: Uuid) -> AppResult<ServiceListing>;

    async fn create_listing(&self, actor: Actor, input: CreateListing) -> AppResult<ServiceListing>;

    async fn update_listing(
        &self,
        actor: Actor,
        id: Uuid,
        changes: ListingChanges,
    ) -> AppResult<ServiceListing>;

    async fn delete_listing(&self, actor: Actor, id: Uuid) -> AppResult<()>;
}

pub struct ListingManager {
    listings: Arc<dyn ListingRepository>,
    providers: Arc<dyn ProviderRepository>,
    categories: Arc<dyn CategoryService>,
    notifications: NotificationHub,
}

impl ListingManager {
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        providers: Arc<dyn ProviderRepository>,
        categories: Arc<dyn CategoryService>,
        notifications: NotificationHub,
    ) -> Self {
        Self {
            listings,
            providers,
            categories,
            notifications,
        }
    }

    async fn resolve_category(&self, category: &CategoryRef) -> AppResult<Uuid> {
        match category {
            CategoryRef::Id(id) => match self.categories.get_category(*id).await {
                Ok(category) => Ok(category.id),
                Err(AppError::NotFound) => Err(AppError::validation("Category does not exist")),
                Err(e) => Err(e),
            },
            CategoryRef::Name(name) => Ok(self.categories.find_or_create(name).await?.0.id),
        }
    }

    /// Load a listing and check the actor owns it through their provider profile.
    async fn owned(&self, actor: &Actor, id: Uuid) -> AppResult<ServiceListing> {
        let listing = self.get_listing(id).await?;
        if actor.is_admin() {
            return Ok(listing);
        }
        let provider = self
            .providers
            .find_by_id(listing.provider_id)
            .await?
            .ok_or(AppError::Forbidden)?;
        actor.require_self_or_admin(provider.user_id)?;
        Ok(listing)
    }
}

fn title(raw: &str) -> AppResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    if title.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Title must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(title.to_string())
}

#[async_trait]
impl ListingService for ListingManager {
    async fn search(
        &self,
        query: ListingQuery,
        page: PaginationParams,
    ) -> AppResult<Paginated<ServiceListing>> {
        let query = query.normalized()?;
        let (items, total) = self.listings.search(&query, page).await?;
        Ok(Paginated::new(items, page, total))
    }

    async fn get_listing(&self, id: Uuid) -> AppResult<ServiceListing> {
        self.listings.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn create_listing(&self, actor: Actor, input: CreateListing) -> AppResult<ServiceListing> {
        let provider = self
            .providers
            .find_by_user(actor.id)
            .await?
            .ok_or_else(|| AppError::validation("Create a provider profile before listing services"))?;

        let title = title(&input.title)?;
        let price_cents = validate_price(input.price_cents)?;

        if self
            .listings
            .find_by_provider_and_title(provider.id, &title)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Service"));
        }

        let category_id = self.resolve_category(&input.category).await?;

        let listing = self
            .listings
            .create(NewListing {
                provider_id: provider.id,
                category_id,
                title,
                description: input.description,
                price_cents,
                image_url: input.image_url,
            })
            .await?;

        tracing::info!(service_id = %listing.id, provider_id = %provider.id, "Service created");
        self.notifications.notify(
            actor.id,
            format!("Service '{}' is now listed", listing.title),
            Severity::Success,
        );

        Ok(listing)
    }

    async fn update_listing(
        &self,
        actor: Actor,
        id: Uuid,
        mut changes: ListingChanges,
    ) -> AppResult<ServiceListing> {
        let listing = self.owned(&actor, id).await?;

        if let Some(raw) = changes.title.take() {
            let new_title = title(&raw)?;
            if let Some(other) = self
                .listings
                .find_by_provider_and_title(listing.provider_id, &new_title)
                .await?
            {
                if other.id != id {
                    return Err(AppError::conflict("Service"));
                }
            }
            changes.title = Some(new_title);
        }
        if let Some(price) = changes.price_cents {
            validate_price(price)?;
        }
        if let Some(category_id) = changes.category_id {
            self.resolve_category(&CategoryRef::Id(category_id)).await?;
        }

        self.listings.update(id, changes).await
    }

    async fn delete_listing(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        self.owned(&actor, id).await?;
        self.listings.delete(id).await?;
        tracing::info!(service_id = %id, "Service deleted");
        Ok(())
    }
}
