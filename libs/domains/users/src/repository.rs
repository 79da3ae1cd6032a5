use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{PreparedUser, User, UserField, UserFilter};

/// Repository trait for User persistence
///
/// Writes take a [`PreparedUser`], so a record can only reach storage after
/// its password went through the save guard. Implementations must reject a
/// `userId` or `secretKey` already held by another record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user
    async fn insert(&self, user: PreparedUser) -> UserResult<User>;

    /// Find a user by `userId`
    async fn find_by_user_id(&self, user_id: &str) -> UserResult<Option<User>>;

    /// List users, newest first
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    /// Count users matching a filter (ignores paging)
    async fn count(&self, filter: UserFilter) -> UserResult<u64>;

    /// Write the changed fields and `updatedAt` onto the stored record with
    /// the same `userId`; returns the record as stored afterwards
    async fn update(&self, user: PreparedUser) -> UserResult<User>;

    /// Delete by `userId`; `false` when nothing matched
    async fn delete_by_user_id(&self, user_id: &str) -> UserResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn secret_key_taken(users: &HashMap<String, User>, candidate: &User) -> bool {
        users
            .values()
            .any(|u| u.user_id != candidate.user_id && u.secret_key == candidate.secret_key)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: PreparedUser) -> UserResult<User> {
        let user = user.into_inner();
        let mut users = self.users.write().await;

        if users.contains_key(&user.user_id) {
            return Err(UserError::DuplicateUserId(user.user_id));
        }
        if Self::secret_key_taken(&users, &user) {
            return Err(UserError::DuplicateSecretKey);
        }

        users.insert(user.user_id.clone(), user.clone());

        tracing::info!(user_id = %user.user_id, "Created user");
        Ok(user)
    }

    async fn find_by_user_id(&self, user_id: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();

        // Newest first, matching the MongoDB sort
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(result
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| filter.matches(u)).count() as u64)
    }

    async fn update(&self, user: PreparedUser) -> UserResult<User> {
        let changed = user.changed_fields().to_vec();
        let next = user.into_inner();
        let mut users = self.users.write().await;

        if changed.contains(&UserField::SecretKey) && Self::secret_key_taken(&users, &next) {
            return Err(UserError::DuplicateSecretKey);
        }

        let Some(stored) = users.get_mut(&next.user_id) else {
            return Err(UserError::NotFound(next.user_id));
        };
        stored.overlay(&next, &changed);

        tracing::info!(user_id = %next.user_id, "Updated user");
        Ok(stored.clone())
    }

    async fn delete_by_user_id(&self, user_id: &str) -> UserResult<bool> {
        let mut users = self.users.write().await;

        if users.remove(user_id).is_some() {
            tracing::info!(user_id = %user_id, "Deleted user");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
