//! Database migrations.
//!
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users_table;
mod m20250101_000002_create_categories_table;
mod m20250101_000003_create_providers_table;
mod m20250101_000004_create_services_table;
mod m20250101_000005_create_hires_table;
mod m20250101_000006_create_payments_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users_table::Migration),
            Box::new(m20250101_000002_create_categories_table::Migration),
            Box::new(m20250101_000003_create_providers_table::Migration),
            Box::new(m20250101_000004_create_services_table::Migration),
            Box::new(m20250101_000005_create_hires_table::Migration),
            Box::new(m20250101_000006_create_payments_table::Migration),
        ]
    }
}
