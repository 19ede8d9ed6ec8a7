//! Migration: Enforce email uniqueness at the storage layer.
//!
//! The index is on `LOWER(email)` so two rows differing only in case collide
//! even when written without going through the service.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

const INDEX_NAME: &str = "idx_users_email";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Expression indexes are not expressible through the schema builder
        manager
            .get_connection()
            .execute_unprepared(&format!(
                "CREATE UNIQUE INDEX {} ON users (LOWER(email))",
                INDEX_NAME
            ))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(&format!("DROP INDEX IF EXISTS {}", INDEX_NAME))
            .await?;
        Ok(())
    }
}
