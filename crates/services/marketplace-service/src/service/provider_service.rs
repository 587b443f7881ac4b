//! Provider profile service.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{NewProvider, Provider, ProviderChanges, MAX_NAME_LENGTH};

use super::Actor;
use crate::repository::ProviderRepository;

#[async_trait]
pub trait ProviderService: Send + Sync {
    async fn list_providers(&self) -> AppResult<Vec<Provider>>;

    async fn get_provider(&self, id: Uuid) -> AppResult<Provider>;

    /// The caller's profile if they have one
    async fn provider_for_user(&self, user_id: Uuid) -> AppResult<Option<Provider>>;

    /// Return the user's profile, creating it from `profile` when missing.
    /// The flag tells whether it was created.
    async fn find_or_create_for_user(&self, profile: NewProvider) -> AppResult<(Provider, bool)>;

    async fn update_provider(
        &self,
        actor: Actor,
        id: Uuid,
        changes: ProviderChanges,
    ) -> AppResult<Provider>;

    async fn delete_provider(&self, actor: Actor, id: Uuid) -> AppResult<()>;
}

pub struct ProviderManager {
    repo: Arc<dyn ProviderRepository>,
}

impl ProviderManager {
    pub fn new(repo: Arc<dyn ProviderRepository>) -> Self {
        Self { repo }
    }

    async fn owned(&self, actor: &Actor, id: Uuid) -> AppResult<Provider> {
        let provider = self.get_provider(id).await?;
        actor.require_self_or_admin(provider.user_id)?;
        Ok(provider)
    }
}

fn display_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("Display name is required"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::validation(format!(
            "Display name must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

#[async_trait]
impl ProviderService for ProviderManager {
    async fn list_providers(&self) -> AppResult<Vec<Provider>> {
        self.repo.list().await
    }

    async fn get_provider(&self, id: Uuid) -> AppResult<Provider> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn provider_for_user(&self, user_id: Uuid) -> AppResult<Option<Provider>> {
        self.repo.find_by_user(user_id).await
    }

    async fn find_or_create_for_user(&self, mut profile: NewProvider) -> AppResult<(Provider, bool)> {
        if let Some(existing) = self.repo.find_by_user(profile.user_id).await? {
            return Ok((existing, false));
        }

        profile.display_name = display_name(&profile.display_name)?;
        let user_id = profile.user_id;
        match self.repo.create(profile).await {
            Ok(provider) => {
                tracing::info!(provider_id = %provider.id, %user_id, "Provider profile created");
                Ok((provider, true))
            }
            Err(AppError::Conflict(_)) => self
                .repo
                .find_by_user(user_id)
                .await?
                .map(|p| (p, false))
                .ok_or_else(|| AppError::conflict("Provider")),
            Err(e) => Err(e),
        }
    }

    async fn update_provider(
        &self,
        actor: Actor,
        id: Uuid,
        mut changes: ProviderChanges,
    ) -> AppResult<Provider> {
        self.owned(&actor, id).await?;
        if let Some(name) = changes.display_name.take() {
            changes.display_name = Some(display_name(&name)?);
        }
        self.repo.update(id, changes).await
    }

    async fn delete_provider(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        self.owned(&actor, id).await?;
        self.repo.delete(id).await
    }
}
