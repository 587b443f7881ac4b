//! User service - account reads, profile updates and removal.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult};
use domain::{User, UserChanges};
use notification_service_lib::NotificationHub;

use crate::repository::UserRepository;

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Apply a partial update; absent fields stay as they are
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> AppResult<User>;

    /// Delete the user together with everything that cascades from it
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;
}

pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    notifications: NotificationHub,
}

impl UserManager {
    pub fn new(repo: Arc<dyn UserRepository>, notifications: NotificationHub) -> Self {
        Self {
            repo,
            notifications,
        }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repo.list().await
    }

    async fn update_user(&self, id: Uuid, mut changes: UserChanges) -> AppResult<User> {
        if let Some(name) = changes.name.take() {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::validation("Name cannot be empty"));
            }
            changes.name = Some(name);
        }

        if changes.is_empty() {
            return self.get_user(id).await;
        }

        self.repo.update(id, changes).await
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await?;
        self.notifications.remove(id);
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }
}
