//! Payment database entity.

use sea_orm::entity::prelude::*;

use domain::{DomainError, Payment};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub hire_id: Uuid,
    pub amount_cents: i64,
    pub currency: String,
    pub method: String,
    pub status: String,
    pub reference: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hire::Entity",
        from = "Column::HireId",
        to = "super::hire::Column::Id",
        on_delete = "Cascade"
    )]
    Hire,
}

impl Related<super::hire::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hire.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Payment {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: model.id,
            hire_id: model.hire_id,
            amount_cents: model.amount_cents,
            currency: model.currency,
            method: model.method.parse()?,
            status: model.status.parse()?,
            reference: model.reference,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
