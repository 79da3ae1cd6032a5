//! User Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, PreparedUser, UpdateUser, User, UserFilter, UserResponse};
use crate::password::{BcryptHasher, PasswordHasher};
use crate::repository::UserRepository;

/// User service providing business logic operations
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<R: UserRepository> UserService<R> {
    /// Service hashing with bcrypt at the default cost
    pub fn new(repository: R) -> Self {
        Self::with_hasher(repository, BcryptHasher::default())
    }

    pub fn with_hasher(repository: R, hasher: impl PasswordHasher + 'static) -> Self {
        Self {
            repository: Arc::new(repository),
            hasher: Arc::new(hasher),
        }
    }

    /// Run the password guard off the async runtime; bcrypt is CPU bound.
    async fn prepare(&self, user: User, previous: Option<User>) -> UserResult<PreparedUser> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || user.prepare_for_save(previous.as_ref(), hasher.as_ref()))
            .await
            .map_err(|e| UserError::Internal(format!("password task failed: {}", e)))?
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id, role = %input.role))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let prepared = self.prepare(User::new(input), None).await?;
        let created = self.repository.insert(prepared).await?;
        Ok(created.into())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> UserResult<UserResponse> {
        self.find(user_id).await.map(Into::into)
    }

    /// Page of users plus the total matching the filter
    #[instrument(skip(self))]
    pub async fn list_users(&self, filter: UserFilter) -> UserResult<(Vec<UserResponse>, u64)> {
        filter
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let total = self.repository.count(filter.clone()).await?;
        let users = self.repository.list(filter).await?;
        Ok((users.into_iter().map(Into::into).collect(), total))
    }

    /// Partial update. The password is rehashed only if the request sets it,
    /// and only fields that differ from the loaded record are written.
    #[instrument(skip(self, input))]
    pub async fn update_user(&self, user_id: &str, input: UpdateUser) -> UserResult<UserResponse> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let previous = self.find(user_id).await?;
        let mut next = previous.clone();
        next.apply_update(input);

        let prepared = self.prepare(next, Some(previous)).await?;
        let updated = self.repository.update(prepared).await?;
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: &str) -> UserResult<()> {
        if !self.repository.delete_by_user_id(user_id).await? {
            return Err(UserError::NotFound(user_id.to_string()));
        }
        Ok(())
    }

    /// Check a plaintext password against the stored hash
    #[instrument(skip(self, plaintext))]
    pub async fn verify_password(&self, user_id: &str, plaintext: &str) -> UserResult<bool> {
        let user = self.find(user_id).await?;
        let hasher = Arc::clone(&self.hasher);
        let plaintext = plaintext.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &user.password))
            .await
            .map_err(|e| UserError::Internal(format!("password task failed: {}", e)))?
    }

    async fn find(&self, user_id: &str) -> UserResult<User> {
        self.repository
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| UserError::NotFound(user_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::password::MockPasswordHasher;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};

    fn service() -> UserService<InMemoryUserRepository> {
        UserService::with_hasher(
            InMemoryUserRepository::new(),
            BcryptHasher::new(4).unwrap(),
        )
    }

    fn create_input(user_id: &str, secret_key: &str) -> CreateUser {
        CreateUser {
            user_id: user_id.to_string(),
            secret_key: secret_key.to_string(),
            password: "S3cure-pw".to_string(),
            role: Role::Lecturer,
            allowed_room: Some("B-204".to_string()),
        }
    }

    #[tokio::test]
    async fn test_created_password_is_stored_hashed() {
        let repo = InMemoryUserRepository::new();
        let service = UserService::with_hasher(repo.clone(), BcryptHasher::new(4).unwrap());

        service
            .create_user(create_input("lect-1", "key-1"))
            .await
            .unwrap();

        let stored = repo.find_by_user_id("lect-1").await.unwrap().unwrap();
        assert_ne!(stored.password, "S3cure-pw");
        assert!(stored.password.starts_with("$2b$04$"));
        assert!(service.verify_password("lect-1", "S3cure-pw").await.unwrap());
        assert!(!service.verify_password("lect-1", "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_without_password_keeps_hash_identical() {
        let repo = InMemoryUserRepository::new();
        let service = UserService::with_hasher(repo.clone(), BcryptHasher::new(4).unwrap());
        service
            .create_user(create_input("lect-1", "key-1"))
            .await
            .unwrap();
        let before = repo.find_by_user_id("lect-1").await.unwrap().unwrap();

        let updated = service
            .update_user(
                "lect-1",
                UpdateUser {
                    role: Some(Role::Admin),
                    allowed_room: Some("C-001".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let after = repo.find_by_user_id("lect-1").await.unwrap().unwrap();
        assert_eq!(after.password, before.password);
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.allowed_room.as_deref(), Some("C-001"));
    }

    #[tokio::test]
    async fn test_stale_role_update_keeps_concurrent_password_change() {
        let repo = InMemoryUserRepository::new();
        let hasher = BcryptHasher::new(4).unwrap();
        let service = UserService::with_hasher(repo.clone(), hasher);
        service
            .create_user(create_input("lect-1", "key-1"))
            .await
            .unwrap();

        // A role change prepared from the record as loaded now
        let loaded = repo.find_by_user_id("lect-1").await.unwrap().unwrap();
        let mut next = loaded.clone();
        next.apply_update(UpdateUser {
            role: Some(Role::Admin),
            ..Default::default()
        });
        let role_change = next.prepare_for_save(Some(&loaded), &hasher).unwrap();

        // A password change lands before it is written
        service
            .update_user(
                "lect-1",
                UpdateUser {
                    password: Some("N3w-pw".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        repo.update(role_change).await.unwrap();

        assert!(service.verify_password("lect-1", "N3w-pw").await.unwrap());
        assert_eq!(service.get_user("lect-1").await.unwrap().role, Role::Admin);
    }

    #[tokio::test]
    async fn test_update_with_password_rehashes() {
        let service = service();
        service
            .create_user(create_input("lect-1", "key-1"))
            .await
            .unwrap();

        service
            .update_user(
                "lect-1",
                UpdateUser {
                    password: Some("N3w-pw".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(service.verify_password("lect-1", "N3w-pw").await.unwrap());
        assert!(!service.verify_password("lect-1", "S3cure-pw").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_user_id() {
        let service = service();
        service.create_user(create_input("u1", "k1")).await.unwrap();

        let result = service.create_user(create_input("u1", "k2")).await;
        assert!(matches!(result, Err(UserError::DuplicateUserId(_))));
    }

    #[tokio::test]
    async fn test_duplicate_secret_key() {
        let service = service();
        service.create_user(create_input("u1", "k1")).await.unwrap();

        let result = service.create_user(create_input("u2", "k1")).await;
        assert!(matches!(result, Err(UserError::DuplicateSecretKey)));
    }

    #[tokio::test]
    async fn test_get_and_delete_missing_user() {
        let service = service();
        assert!(matches!(
            service.get_user("nobody").await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_user("nobody").await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let service = service();
        let result = service.create_user(create_input("", "k1")).await;
        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_users_returns_total() {
        let service = service();
        for i in 0..3 {
            service
                .create_user(create_input(&format!("u{}", i), &format!("k{}", i)))
                .await
                .unwrap();
        }

        let (page, total) = service
            .list_users(UserFilter {
                limit: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_list_users_rejects_zero_limit_before_querying() {
        let mut repo = MockUserRepository::new();
        repo.expect_count().never();
        repo.expect_list().never();

        let service = UserService::with_hasher(repo, BcryptHasher::new(4).unwrap());
        let result = service
            .list_users(UserFilter {
                limit: 0,
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(UserError::Validation(_))));
    }

    #[tokio::test]
    async fn test_hash_failure_never_reaches_repository() {
        let mut repo = MockUserRepository::new();
        repo.expect_insert().never();

        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Err(UserError::PasswordHash("boom".to_string())));

        let service = UserService::with_hasher(repo, hasher);
        let result = service.create_user(create_input("u1", "k1")).await;
        assert!(matches!(result, Err(UserError::PasswordHash(_))));
    }

    #[tokio::test]
    async fn test_repository_error_propagates() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_user_id()
            .returning(|_| Err(UserError::Internal("connection reset".to_string())));

        let service = UserService::with_hasher(repo, BcryptHasher::new(4).unwrap());
        let result = service.get_user("u1").await;
        assert!(matches!(result, Err(UserError::Internal(_))));
    }
}
