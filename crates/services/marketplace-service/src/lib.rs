//! Marketplace service library.
//!
//! Persistence (SeaORM entities, migrations, repositories) and business
//! services for users, categories, providers, service listings, hires and
//! payments. The HTTP gateway builds a [`Services`] container from a
//! database connection and calls into it.

pub mod infra;
pub mod repository;
pub mod service;

use common::DatabaseConfig;
use sea_orm::DbErr;
use tracing::info;

pub use infra::Database;
pub use service::*;

/// Migration action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Run a migration command against the configured database.
pub async fn run_migrations(config: &DatabaseConfig, action: MigrateAction) -> Result<(), DbErr> {
    let db = Database::connect_without_migrations(config).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            for (name, applied) in db.migration_status().await? {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}
