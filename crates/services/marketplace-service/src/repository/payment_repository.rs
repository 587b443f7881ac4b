//! Payment repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use super::entities::payment::{self, ActiveModel, Entity as PaymentEntity};
use super::entities::{hire, provider, service};
use super::{corrupt_row, write_error};
use common::{AppError, AppResult};
use domain::{NewPayment, Payment, PaymentChanges, PaymentStatus};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>>;

    /// Create a payment in `pending` status
    async fn create(&self, payment: NewPayment) -> AppResult<Payment>;

    async fn update(&self, id: Uuid, changes: PaymentChanges) -> AppResult<Payment>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Payments on hires where the user is the client or the provider
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>>;

    async fn list_all(&self) -> AppResult<Vec<Payment>>;
}

pub struct PaymentStore {
    db: DatabaseConnection,
}

impl PaymentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn into_domain(models: Vec<payment::Model>) -> AppResult<Vec<Payment>> {
    models
        .into_iter()
        .map(|m| Payment::try_from(m).map_err(corrupt_row))
        .collect()
}

#[async_trait]
impl PaymentRepository for PaymentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        PaymentEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|m| Payment::try_from(m).map_err(corrupt_row))
            .transpose()
    }

    async fn create(&self, new: NewPayment) -> AppResult<Payment> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            hire_id: Set(new.hire_id),
            amount_cents: Set(new.amount_cents),
            currency: Set(new.currency),
            method: Set(new.method.as_str().to_string()),
            status: Set(PaymentStatus::Pending.as_str().to_string()),
            reference: Set(new.reference),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| write_error(e, "Payment"))?;
        Payment::try_from(model).map_err(corrupt_row)
    }

    async fn update(&self, id: Uuid, changes: PaymentChanges) -> AppResult<Payment> {
        let existing = PaymentEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        if let Some(status) = changes.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(reference) = changes.reference {
            active.reference = Set(Some(reference));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| write_error(e, "Payment"))?;
        Payment::try_from(model).map_err(corrupt_row)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = PaymentEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Payment>> {
        let models = PaymentEntity::find()
            .join(JoinType::InnerJoin, payment::Relation::Hire.def())
            .join(JoinType::InnerJoin, hire::Relation::Service.def())
            .join(JoinType::InnerJoin, service::Relation::Provider.def())
            .filter(
                Condition::any()
                    .add(hire::Column::ClientId.eq(user_id))
                    .add(provider::Column::UserId.eq(user_id)),
            )
            .order_by_desc(payment::Column::CreatedAt)
            .all(&self.db)
            .await?;
        into_domain(models)
    }

    async fn list_all(&self) -> AppResult<Vec<Payment>> {
        let models = PaymentEntity::find()
            .order_by_desc(payment::Column::CreatedAt)
            .all(&self.db)
            .await?;
        into_domain(models)
    }
}
