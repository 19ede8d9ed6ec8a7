//! User service - validation, persistence and credential checks.
//!
//! Persisting is an explicit two-phase call: [`UserService::validate`] turns a
//! candidate into a [`ValidatedUser`] (every rule checked, password hashed),
//! then [`UserService::persist`] writes it. [`UserService::register`] chains
//! the two and folds storage-level uniqueness conflicts back into validation
//! errors.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{
    NewUser, PasswordDigest, PasswordHasher, Rule, User, UserField, ValidatedUser,
    ValidationErrors,
};

use crate::repository::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Run every rule against a new candidate and hash its password.
    async fn validate(&self, candidate: NewUser) -> AppResult<ValidatedUser>;

    /// Same as `validate`, but uniqueness ignores the user with `id`.
    async fn validate_for(&self, id: Uuid, candidate: NewUser) -> AppResult<ValidatedUser>;

    /// Write a validated user. A unique-index rejection surfaces as
    /// `AppError::UniquenessConflict`.
    async fn persist(&self, user: ValidatedUser) -> AppResult<User>;

    /// Validate and persist, retrying once on a uniqueness conflict.
    async fn register(&self, candidate: NewUser) -> AppResult<User>;

    /// Re-validate and re-save an existing user
    async fn update_user(&self, id: Uuid, candidate: NewUser) -> AppResult<User>;

    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Get user by email, ignoring case
    async fn get_user_by_email(&self, email: &str) -> AppResult<User>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Permanently delete a user
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    /// Look up a user by email and check the password against its digest
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User>;

    /// Hash an arbitrary string with the configured cost
    fn digest(&self, plain_text: &str) -> AppResult<PasswordDigest>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl UserManager {
    /// Create new user service instance with repository and hasher
    pub fn new(repo: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    async fn check_candidate(
        &self,
        candidate: NewUser,
        exclude: Option<Uuid>,
    ) -> AppResult<ValidatedUser> {
        let mut errors = candidate.check().err().unwrap_or_default();

        if !candidate.email.trim().is_empty() {
            if let Some(existing) = self.repo.find_by_email(&candidate.email).await? {
                if Some(existing.id) != exclude {
                    errors.add(UserField::Email, Rule::Taken);
                }
            }
        }

        if !errors.is_empty() {
            tracing::debug!(email = %candidate.email, "User validation failed: {}", errors);
            return Err(AppError::Validation(errors));
        }

        let digest = self.hasher.hash(&candidate.password)?;
        Ok(ValidatedUser::accept(candidate, digest))
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn validate(&self, candidate: NewUser) -> AppResult<ValidatedUser> {
        self.check_candidate(candidate, None).await
    }

    async fn validate_for(&self, id: Uuid, candidate: NewUser) -> AppResult<ValidatedUser> {
        self.check_candidate(candidate, Some(id)).await
    }

    async fn persist(&self, user: ValidatedUser) -> AppResult<User> {
        let stored = self.repo.insert(user).await?;
        tracing::info!(user_id = %stored.id, "User created");
        Ok(stored)
    }

    async fn register(&self, candidate: NewUser) -> AppResult<User> {
        let validated = self.validate(candidate.clone()).await?;

        match self.persist(validated).await {
            Err(AppError::UniquenessConflict(detail)) => {
                tracing::warn!(
                    email = %candidate.email,
                    "Unique index rejected a validated user ({}), retrying once",
                    detail
                );
                let validated = self.validate(candidate).await?;
                self.persist(validated)
                    .await
                    .map_err(AppError::into_validation)
            }
            other => other,
        }
    }

    async fn update_user(&self, id: Uuid, candidate: NewUser) -> AppResult<User> {
        self.repo.find_by_id(id).await?.ok_or_not_found()?;

        let validated = self.validate_for(id, candidate).await?;
        let updated = self
            .repo
            .update(id, validated)
            .await
            .map_err(AppError::into_validation)?;

        tracing::info!(user_id = %id, "User updated");
        Ok(updated)
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.repo.find_by_id(id).await?.ok_or_not_found()
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        self.repo.find_by_email(email).await?.ok_or_not_found()
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repo.list().await
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.repo.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.authenticate(&self.hasher, password) {
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    fn digest(&self, plain_text: &str) -> AppResult<PasswordDigest> {
        Ok(self.hasher.hash(plain_text)?)
    }
}

/// Errors that mean "the email is already in use", from either layer.
pub fn is_email_taken(err: &AppError) -> bool {
    err.violations()
        .map(|v: ValidationErrors| v.has(UserField::Email, Rule::Taken))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use crate::repository::MockUserRepository;

    fn candidate() -> NewUser {
        NewUser::new("Example User", "user@example.com", "foobar", "foobar")
    }

    fn stored_user(id: Uuid, email: &str, hasher: &PasswordHasher) -> User {
        User {
            id,
            name: "Example User".to_string(),
            email: email.to_string(),
            password_digest: hasher.hash("foobar").unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(repo: MockUserRepository) -> UserManager {
        UserManager::new(Arc::new(repo), PasswordHasher::minimum())
    }

    #[tokio::test]
    async fn test_validate_hashes_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let validated = service(repo).validate(candidate()).await.unwrap();

        assert_ne!(validated.password_digest().as_str(), "foobar");
        assert!(PasswordHasher::minimum().verify("foobar", validated.password_digest()));
    }

    #[tokio::test]
    async fn test_validate_reports_taken_email() {
        let hasher = PasswordHasher::minimum();
        let existing = stored_user(Uuid::new_v4(), "user@example.com", &hasher);

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .withf(|email| email == "USER@EXAMPLE.COM")
            .returning(move |_| Ok(Some(existing.clone())));

        let mut dup = candidate();
        dup.email = "USER@EXAMPLE.COM".to_string();
        let err = service(repo).validate(dup).await.unwrap_err();

        assert!(is_email_taken(&err));
    }

    #[tokio::test]
    async fn test_validate_collects_sync_and_uniqueness_errors() {
        let hasher = PasswordHasher::minimum();
        let existing = stored_user(Uuid::new_v4(), "user@example.com", &hasher);

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(existing.clone())));

        let bad = NewUser::new("", "user@example.com", "abc", "abc");
        let err = service(repo).validate(bad).await.unwrap_err();
        let violations = err.violations().unwrap();

        assert!(violations.has(UserField::Name, Rule::Blank));
        assert!(violations.has(UserField::Email, Rule::Taken));
        assert!(violations.has(UserField::Password, Rule::TooShort));
    }

    #[tokio::test]
    async fn test_blank_email_skips_uniqueness_lookup() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().never();

        let mut blank = candidate();
        blank.email = "   ".to_string();
        let err = service(repo).validate(blank).await.unwrap_err();

        assert!(err.violations().unwrap().has(UserField::Email, Rule::Blank));
    }

    #[tokio::test]
    async fn test_validate_for_ignores_own_record() {
        let hasher = PasswordHasher::minimum();
        let id = Uuid::new_v4();
        let own = stored_user(id, "user@example.com", &hasher);

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(own.clone())));

        let result = service(repo).validate_for(id, candidate()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        repo.expect_insert().times(1).returning(|validated| {
            Ok(User {
                id: Uuid::new_v4(),
                name: validated.name().to_string(),
                email: validated.normalized_email(),
                password_digest: validated.password_digest().clone(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });

        let mut mixed = candidate();
        mixed.email = "Foo@ExAMPle.CoM".to_string();
        let user = service(repo).register(mixed).await.unwrap();

        assert_eq!(user.email, "foo@example.com");
        assert!(!user.password_digest.is_empty());
    }

    #[tokio::test]
    async fn test_register_retries_once_and_reports_taken() {
        let hasher = PasswordHasher::minimum();
        let winner = stored_user(Uuid::new_v4(), "user@example.com", &hasher);

        // First lookup sees nothing (the race); the retry sees the winner's row
        let lookups = Arc::new(AtomicUsize::new(0));
        let counter = lookups.clone();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().times(2).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(None)
            } else {
                Ok(Some(winner.clone()))
            }
        });
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(AppError::UniquenessConflict("idx_users_email".into())));

        let err = service(repo).register(candidate()).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(is_email_taken(&err));
        assert_eq!(lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_register_second_conflict_becomes_validation_error() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().times(2).returning(|_| Ok(None));
        repo.expect_insert()
            .times(2)
            .returning(|_| Err(AppError::UniquenessConflict("idx_users_email".into())));

        let err = service(repo).register(candidate()).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(is_email_taken(&err));
    }

    #[tokio::test]
    async fn test_persist_surfaces_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_insert()
            .returning(|_| Err(AppError::UniquenessConflict("idx_users_email".into())));

        let digest = PasswordHasher::minimum().hash("foobar").unwrap();
        let validated = ValidatedUser::accept(candidate(), digest);
        let err = service(repo).persist(validated).await.unwrap_err();

        assert!(matches!(err, AppError::UniquenessConflict(_)));
        assert!(is_email_taken(&err));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_update().never();

        let err = service(repo)
            .update_user(Uuid::new_v4(), candidate())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let result = service(repo).get_user(Uuid::new_v4()).await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let hasher = PasswordHasher::minimum();
        let user = stored_user(Uuid::new_v4(), "user@example.com", &hasher);

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        let service = service(repo);

        assert!(service.authenticate("user@example.com", "foobar").await.is_ok());
        assert!(matches!(
            service.authenticate("user@example.com", "wrong!").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));

        let result = service(repo).authenticate("nobody@example.com", "foobar").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_digest() {
        let service = service(MockUserRepository::new());
        let digest = service.digest("remember-token").unwrap();

        assert!(PasswordHasher::minimum().verify("remember-token", &digest));
    }
}
