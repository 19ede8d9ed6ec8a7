//! User Service Library
//!
//! Validation, password hashing and persistence for user accounts, plus the
//! schema migrations that back them. The `user-service` binary wraps this
//! crate in an operator CLI.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use common::{AppError, AppResult};
use domain::PasswordHasher;

use crate::config::UserServiceConfig;
use crate::infra::Database;
use crate::repository::UserStore;
use crate::service::{UserManager, UserService};

/// Wire the repository and hasher into a service over an open database.
pub fn build_service(db: &Database, config: &UserServiceConfig) -> AppResult<Arc<dyn UserService>> {
    let hasher = PasswordHasher::new(config.hashing.cost)?;
    let user_repo = Arc::new(UserStore::new(db.get_connection()));
    Ok(Arc::new(UserManager::new(user_repo, hasher)))
}

/// Connect, apply pending migrations and build the service.
pub async fn connect(config: &UserServiceConfig) -> AppResult<(Database, Arc<dyn UserService>)> {
    let db = Database::connect(&config.database).await?;
    let service = build_service(&db, config)?;
    Ok((db, service))
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction, config: &UserServiceConfig) -> AppResult<()> {
    // Connect without auto-running migrations for manual control
    let db = Database::connect_without_migrations(&config.database)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

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
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Resetting database and running all migrations...");
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
