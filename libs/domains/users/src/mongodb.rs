//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use database::mongodb::{drop_index_if_exists, duplicate_key_index};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Document, doc},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use tracing::{instrument, warn};

use crate::error::{UserError, UserResult};
use crate::models::{PreparedUser, User, UserFilter};
use crate::repository::UserRepository;

pub const USERS_COLLECTION: &str = "users";

/// Unique index left over from an older schema keyed on `username`.
pub const LEGACY_USERNAME_INDEX: &str = "username_1";

pub const USER_ID_INDEX: &str = "userId_1";
pub const SECRET_KEY_INDEX: &str = "secretKey_1";

/// MongoDB implementation of the UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    /// ```ignore
    /// let db = client.database("rooms");
    /// let repo = MongoUserRepository::new(db);
    /// repo.init_indexes().await?;
    /// ```
    pub fn new(db: Database) -> Self {
        Self::with_collection(db, USERS_COLLECTION)
    }

    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<User>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<User> {
        &self.collection
    }

    /// Prepare the collection's indexes.
    ///
    /// Drops [`LEGACY_USERNAME_INDEX`] first. A missing index or collection
    /// is ignored, any other failure is logged and ignored. Then ensures the
    /// unique indexes on `userId` and `secretKey`; failing that is an error.
    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    pub async fn init_indexes(&self) -> UserResult<()> {
        match drop_index_if_exists(&self.collection, LEGACY_USERNAME_INDEX).await {
            Ok(true) => tracing::info!(index = LEGACY_USERNAME_INDEX, "Dropped legacy index"),
            Ok(false) => {}
            Err(e) => warn!(
                index = LEGACY_USERNAME_INDEX,
                error = %e,
                "Could not drop legacy index, continuing"
            ),
        }

        let indexes = [("userId", USER_ID_INDEX), ("secretKey", SECRET_KEY_INDEX)]
            .into_iter()
            .map(|(field, name)| {
                let mut keys = Document::new();
                keys.insert(field, 1);
                IndexModel::builder()
                    .keys(keys)
                    .options(
                        IndexOptions::builder()
                            .name(name.to_string())
                            .unique(true)
                            .build(),
                    )
                    .build()
            });

        self.collection.create_indexes(indexes).await?;
        tracing::info!("User indexes ready");
        Ok(())
    }

    fn build_filter(filter: &UserFilter) -> Document {
        let mut doc = doc! {};

        if let Some(role) = filter.role {
            doc.insert("role", role.to_string());
        }

        if let Some(ref room) = filter.allowed_room {
            doc.insert("allowedRoom", room);
        }

        doc
    }

    /// `$set` for the changed fields and `updatedAt`; `$unset` for changed
    /// fields that are now absent.
    fn update_document(user: &PreparedUser) -> UserResult<Document> {
        let stored = bson::to_document(user.user())
            .map_err(|e| UserError::Internal(format!("failed to encode user: {}", e)))?;

        let mut set = Document::new();
        let mut unset = Document::new();
        let keys = user
            .changed_fields()
            .iter()
            .map(|field| field.key())
            .chain(["updatedAt"]);

        for key in keys {
            match stored.get(key) {
                Some(value) => {
                    set.insert(key, value.clone());
                }
                None => {
                    unset.insert(key, "");
                }
            }
        }

        let mut update = doc! { "$set": set };
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }
        Ok(update)
    }

    /// Map a write failure, turning unique index violations into domain errors.
    fn map_write_error(err: mongodb::error::Error, user: &User) -> UserError {
        match duplicate_key_index(&err).as_deref() {
            Some(USER_ID_INDEX) => UserError::DuplicateUserId(user.user_id.clone()),
            Some(SECRET_KEY_INDEX) => UserError::DuplicateSecretKey,
            _ => UserError::Database(err),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.user().user_id))]
    async fn insert(&self, user: PreparedUser) -> UserResult<User> {
        let user = user.into_inner();

        self.collection
            .insert_one(&user)
            .await
            .map_err(|e| Self::map_write_error(e, &user))?;

        tracing::info!("User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_user_id(&self, user_id: &str) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "userId": user_id }).await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let options = FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.offset)
            .sort(doc! { "createdAt": -1 })
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .with_options(options)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(&filter))
            .await?)
    }

    #[instrument(skip(self, user), fields(user_id = %user.user().user_id))]
    async fn update(&self, user: PreparedUser) -> UserResult<User> {
        let update = Self::update_document(&user)?;
        let user = user.into_inner();

        let updated = self
            .collection
            .find_one_and_update(doc! { "userId": &user.user_id }, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| Self::map_write_error(e, &user))?;

        match updated {
            Some(stored) => {
                tracing::info!("User updated");
                Ok(stored)
            }
            None => Err(UserError::NotFound(user.user_id)),
        }
    }

    #[instrument(skip(self))]
    async fn delete_by_user_id(&self, user_id: &str) -> UserResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "userId": user_id })
            .await?;

        if result.deleted_count > 0 {
            tracing::info!("User deleted");
        }
        Ok(result.deleted_count > 0)
    }
}
