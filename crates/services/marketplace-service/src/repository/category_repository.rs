//! Category repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::category::{self, ActiveModel, Entity as CategoryEntity};
use super::write_error;
use common::{AppError, AppResult};
use domain::{Category, CategoryChanges};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>>;

    /// Exact match on the stored (trimmed) name
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>>;

    async fn create(&self, name: String, description: Option<String>) -> AppResult<Category>;

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> AppResult<Category>;

    /// Delete category; its services go with it
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// All categories ordered by name
    async fn list(&self) -> AppResult<Vec<Category>>;
}

pub struct CategoryStore {
    db: DatabaseConnection,
}

impl CategoryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for CategoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Category::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .one(&self.db)
            .await?;
        Ok(result.map(Category::from))
    }

    async fn create(&self, name: String, description: Option<String>) -> AppResult<Category> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| write_error(e, "Category"))?;
        Ok(Category::from(model))
    }

    async fn update(&self, id: Uuid, changes: CategoryChanges) -> AppResult<Category> {
        let existing = CategoryEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| write_error(e, "Category"))?;
        Ok(Category::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = CategoryEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Category>> {
        let models = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }
}
