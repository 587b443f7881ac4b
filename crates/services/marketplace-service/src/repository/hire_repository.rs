//! Hire repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use super::entities::hire::{self, ActiveModel, Entity as HireEntity};
use super::entities::{provider, service};
use super::{corrupt_row, write_error};
use common::{AppError, AppResult};
use domain::{Hire, HireChanges, HireStatus, NewHire};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait HireRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Hire>>;

    /// Create a hire in `pending` status
    async fn create(&self, hire: NewHire) -> AppResult<Hire>;

    async fn update(&self, id: Uuid, changes: HireChanges) -> AppResult<Hire>;

    /// Delete hire; its payments go with it
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Hires where the user is the client or owns the hired service
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Hire>>;

    async fn list_all(&self) -> AppResult<Vec<Hire>>;
}

pub struct HireStore {
    db: DatabaseConnection,
}

impl HireStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn into_domain(models: Vec<hire::Model>) -> AppResult<Vec<Hire>> {
    models
        .into_iter()
        .map(|m| Hire::try_from(m).map_err(corrupt_row))
        .collect()
}

#[async_trait]
impl HireRepository for HireStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Hire>> {
        HireEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|m| Hire::try_from(m).map_err(corrupt_row))
            .transpose()
    }

    async fn create(&self, new: NewHire) -> AppResult<Hire> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            service_id: Set(new.service_id),
            client_id: Set(new.client_id),
            status: Set(HireStatus::Pending.as_str().to_string()),
            scheduled_for: Set(new.scheduled_for),
            notes: Set(new.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| write_error(e, "Hire"))?;
        Hire::try_from(model).map_err(corrupt_row)
    }

    async fn update(&self, id: Uuid, changes: HireChanges) -> AppResult<Hire> {
        let existing = HireEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        if let Some(status) = changes.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(scheduled_for) = changes.scheduled_for {
            active.scheduled_for = Set(Some(scheduled_for));
        }
        if let Some(notes) = changes.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| write_error(e, "Hire"))?;
        Hire::try_from(model).map_err(corrupt_row)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = HireEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Hire>> {
        let models = HireEntity::find()
            .join(JoinType::InnerJoin, hire::Relation::Service.def())
            .join(JoinType::InnerJoin, service::Relation::Provider.def())
            .filter(
                Condition::any()
                    .add(hire::Column::ClientId.eq(user_id))
                    .add(provider::Column::UserId.eq(user_id)),
            )
            .order_by_desc(hire::Column::CreatedAt)
            .all(&self.db)
            .await?;
        into_domain(models)
    }

    async fn list_all(&self) -> AppResult<Vec<Hire>> {
        let models = HireEntity::find()
            .order_by_desc(hire::Column::CreatedAt)
            .all(&self.db)
            .await?;
        into_domain(models)
    }
}
