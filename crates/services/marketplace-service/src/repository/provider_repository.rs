//! Provider profile repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::provider::{self, ActiveModel, Entity as ProviderEntity};
use super::write_error;
use common::{AppError, AppResult};
use domain::{NewProvider, Provider, ProviderChanges};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProviderRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Provider>>;

    /// The profile owned by `user_id`, if any
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Provider>>;

    async fn create(&self, provider: NewProvider) -> AppResult<Provider>;

    async fn update(&self, id: Uuid, changes: ProviderChanges) -> AppResult<Provider>;

    /// Delete profile; its services go with it
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn list(&self) -> AppResult<Vec<Provider>>;
}

pub struct ProviderStore {
    db: DatabaseConnection,
}

impl ProviderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProviderRepository for ProviderStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Provider>> {
        let result = ProviderEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Provider::from))
    }

    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Provider>> {
        let result = ProviderEntity::find()
            .filter(provider::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(result.map(Provider::from))
    }

    async fn create(&self, new: NewProvider) -> AppResult<Provider> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            display_name: Set(new.display_name),
            bio: Set(new.bio),
            phone: Set(new.phone),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| write_error(e, "Provider"))?;
        Ok(Provider::from(model))
    }

    async fn update(&self, id: Uuid, changes: ProviderChanges) -> AppResult<Provider> {
        let existing = ProviderEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        if let Some(display_name) = changes.display_name {
            active.display_name = Set(display_name);
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(Some(phone));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| write_error(e, "Provider"))?;
        Ok(Provider::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = ProviderEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Provider>> {
        let models = ProviderEntity::find()
            .order_by_asc(provider::Column::DisplayName)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Provider::from).collect())
    }
}
