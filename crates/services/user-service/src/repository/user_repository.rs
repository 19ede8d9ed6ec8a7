//! User repository implementation.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use common::{AppError, AppResult};
use domain::{normalize_email, User, ValidatedUser};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Writes take a [`ValidatedUser`], so nothing reaches storage without
/// passing the rule set first. Email lookups ignore case.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by email address, compared case-insensitively
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new user; the email is written lower-cased
    async fn insert(&self, user: ValidatedUser) -> AppResult<User>;

    /// Overwrite an existing user's attributes; the email is written lower-cased
    async fn update(&self, id: Uuid, user: ValidatedUser) -> AppResult<User>;

    /// Permanently delete user by ID
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// List all users, oldest first
    async fn list(&self) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(user::Column::Email)))
                    .eq(normalize_email(email)),
            )
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn insert(&self, user: ValidatedUser) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(user.name().to_string()),
            email: Set(user.normalized_email()),
            password_digest: Set(user.password_digest().as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn update(&self, id: Uuid, user: ValidatedUser) -> AppResult<User> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(user.name().to_string());
        active.email = Set(user.normalized_email());
        active.password_digest = Set(user.password_digest().as_str().to_string());
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;
        Ok(User::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }
}
