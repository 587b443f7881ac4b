//! Category service.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{normalize_category_name, Category, CategoryChanges};

use crate::repository::CategoryRepository;

#[async_trait]
pub trait CategoryService: Send + Sync {
    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    async fn get_category(&self, id: Uuid) -> AppResult<Category>;

    /// Create a category; a taken name is a conflict
    async fn create_category(&self, name: String, description: Option<String>)
        -> AppResult<Category>;

    /// Return the category with this name, creating it when missing.
    /// The flag tells whether it was created.
    async fn find_or_create(&self, name: &str) -> AppResult<(Category, bool)>;

    async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> AppResult<Category>;

    async fn delete_category(&self, id: Uuid) -> AppResult<()>;
}

pub struct CategoryManager {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryManager {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl CategoryService for CategoryManager {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.repo.list().await
    }

    async fn get_category(&self, id: Uuid) -> AppResult<Category> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn create_category(
        &self,
        name: String,
        description: Option<String>,
    ) -> AppResult<Category> {
        let name = normalize_category_name(&name)?;
        if self.repo.find_by_name(&name).await?.is_some() {
            return Err(AppError::conflict("Category"));
        }
        let category = self.repo.create(name, description).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    async fn find_or_create(&self, name: &str) -> AppResult<(Category, bool)> {
        let name = normalize_category_name(name)?;
        if let Some(existing) = self.repo.find_by_name(&name).await? {
            return Ok((existing, false));
        }

        match self.repo.create(name.clone(), None).await {
            Ok(category) => Ok((category, true)),
            // Lost a race with a concurrent insert of the same name
            Err(AppError::Conflict(_)) => self
                .repo
                .find_by_name(&name)
                .await?
                .map(|c| (c, false))
                .ok_or_else(|| AppError::conflict("Category")),
            Err(e) => Err(e),
        }
    }

    async fn update_category(&self, id: Uuid, mut changes: CategoryChanges) -> AppResult<Category> {
        if let Some(name) = changes.name.take() {
            let name = normalize_category_name(&name)?;
            if let Some(other) = self.repo.find_by_name(&name).await? {
                if other.id != id {
                    return Err(AppError::conflict("Category"));
                }
            }
            changes.name = Some(name);
        }
        self.repo.update(id, changes).await
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await?;
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
