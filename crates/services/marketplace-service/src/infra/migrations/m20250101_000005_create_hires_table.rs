//! Migration: Create hires table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Hires::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Hires::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Hires::ServiceId).uuid().not_null())
                    .col(ColumnDef::new(Hires::ClientId).uuid().not_null())
                    .col(
                        ColumnDef::new(Hires::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Hires::ScheduledFor)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Hires::Notes).text().null())
                    .col(
                        ColumnDef::new(Hires::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Hires::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hires_service_id")
                            .from(Hires::Table, Hires::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hires_client_id")
                            .from(Hires::Table, Hires::ClientId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_hires_client_id")
                    .table(Hires::Table)
                    .col(Hires::ClientId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Hires::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Hires {
    Table,
    Id,
    ServiceId,
    ClientId,
    Status,
    ScheduledFor,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Services {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
