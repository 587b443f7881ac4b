//! Migration: Create services table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Services::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Services::ProviderId).uuid().not_null())
                    .col(ColumnDef::new(Services::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(Services::Title).string_len(120).not_null())
                    .col(ColumnDef::new(Services::Description).text().null())
                    .col(
                        ColumnDef::new(Services::PriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Services::ImageUrl).string().null())
                    .col(
                        ColumnDef::new(Services::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Services::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_services_provider_id")
                            .from(Services::Table, Services::ProviderId)
                            .to(Providers::Table, Providers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_services_category_id")
                            .from(Services::Table, Services::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A provider cannot list two services with the same title
        manager
            .create_index(
                Index::create()
                    .name("idx_services_provider_title")
                    .table(Services::Table)
                    .col(Services::ProviderId)
                    .col(Services::Title)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_services_category_id")
                    .table(Services::Table)
                    .col(Services::CategoryId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Services::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Services {
    Table,
    Id,
    ProviderId,
    CategoryId,
    Title,
    Description,
    PriceCents,
    ImageUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Providers {
    Table,
    Id,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
}
