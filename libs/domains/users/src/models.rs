use chrono::{DateTime, Utc};
use mongodb::bson;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::UserResult;
use crate::password::PasswordHasher;

/// Access role of a user
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Lecturer,
}

/// User document as stored in the `users` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// External identifier, unique
    pub user_id: String,
    /// Unique per user
    pub secret_key: String,
    /// bcrypt hash once saved; plaintext only between construction and save
    pub password: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_room: Option<String>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

/// Stored fields a partial update can change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    SecretKey,
    Password,
    Role,
    AllowedRoom,
}

impl UserField {
    pub const ALL: [UserField; 4] = [
        UserField::SecretKey,
        UserField::Password,
        UserField::Role,
        UserField::AllowedRoom,
    ];

    /// Document key of the field
    pub fn key(self) -> &'static str {
        match self {
            UserField::SecretKey => "secretKey",
            UserField::Password => "password",
            UserField::Role => "role",
            UserField::AllowedRoom => "allowedRoom",
        }
    }
}

/// A [`User`] whose password has been through the save guard, plus the
/// fields that differ from the stored record.
///
/// Repositories only accept this type for writes. Updates write the
/// changed fields and `updatedAt`, nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedUser {
    user: User,
    changed: Vec<UserField>,
}

impl PreparedUser {
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Fields that differ from the stored record; all of them on insert
    pub fn changed_fields(&self) -> &[UserField] {
        &self.changed
    }

    pub fn into_inner(self) -> User {
        self.user
    }
}

impl User {
    /// New record from a create request. `password` is still plaintext.
    pub fn new(input: CreateUser) -> Self {
        let now = bson::DateTime::now();
        Self {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            secret_key: input.secret_key,
            password: input.password,
            role: input.role,
            allowed_room: input.allowed_room.filter(|room| !room.is_empty()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. A new password is stored as given and hashed
    /// by [`prepare_for_save`](Self::prepare_for_save).
    ///
    /// An empty `allowedRoom` clears the field.
    pub fn apply_update(&mut self, update: UpdateUser) {
        if let Some(secret_key) = update.secret_key {
            self.secret_key = secret_key;
        }
        if let Some(password) = update.password {
            self.password = password;
        }
        if let Some(role) = update.role {
            self.role = role;
        }
        if let Some(room) = update.allowed_room {
            self.allowed_room = (!room.is_empty()).then_some(room);
        }
        self.updated_at = bson::DateTime::now();
    }

    /// Prepare a new record for insertion. The password is always hashed.
    pub fn prepare_insert(self, hasher: &dyn PasswordHasher) -> UserResult<PreparedUser> {
        self.prepare_for_save(None, hasher)
    }

    /// Hash the password if it changed relative to `previous`.
    ///
    /// `previous` must be the record as loaded from the repository, or
    /// `None` on insert. When the password equals the stored value it is
    /// kept byte-for-byte; otherwise it is replaced by a freshly salted
    /// hash. A hashing failure aborts the write.
    pub(crate) fn prepare_for_save(
        mut self,
        previous: Option<&User>,
        hasher: &dyn PasswordHasher,
    ) -> UserResult<PreparedUser> {
        let changed = match previous {
            Some(stored) => self.diff(stored),
            None => UserField::ALL.to_vec(),
        };

        if changed.contains(&UserField::Password) {
            self.password = hasher.hash(&self.password)?;
        }

        Ok(PreparedUser {
            user: self,
            changed,
        })
    }

    fn diff(&self, stored: &User) -> Vec<UserField> {
        UserField::ALL
            .into_iter()
            .filter(|field| match field {
                UserField::SecretKey => self.secret_key != stored.secret_key,
                UserField::Password => self.password != stored.password,
                UserField::Role => self.role != stored.role,
                UserField::AllowedRoom => self.allowed_room != stored.allowed_room,
            })
            .collect()
    }

    /// Copy `fields` and `updatedAt` from `source`
    pub fn overlay(&mut self, source: &User, fields: &[UserField]) {
        for field in fields {
            match field {
                UserField::SecretKey => self.secret_key = source.secret_key.clone(),
                UserField::Password => self.password = source.password.clone(),
                UserField::Role => self.role = source.role,
                UserField::AllowedRoom => self.allowed_room = source.allowed_room.clone(),
            }
        }
        self.updated_at = source.updated_at;
    }
}

/// User as returned by the API. Never carries `password` or `secretKey`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub user_id: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_room: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn to_chrono(ts: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or_default()
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            user_id: user.user_id,
            role: user.role,
            allowed_room: user.allowed_room,
            created_at: to_chrono(user.created_at),
            updated_at: to_chrono(user.updated_at),
        }
    }
}

/// Request body for creating a user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    #[validate(length(min = 1, max = 256))]
    pub secret_key: String,
    #[validate(length(min = 1, max = 72))]
    pub password: String,
    pub role: Role,
    #[validate(length(max = 128))]
    pub allowed_room: Option<String>,
}

/// Request body for a partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 256))]
    pub secret_key: Option<String>,
    #[validate(length(min = 1, max = 72))]
    pub password: Option<String>,
    pub role: Option<Role>,
    /// Empty string clears the room
    #[validate(length(max = 128))]
    pub allowed_room: Option<String>,
}

/// Query filters for listing users
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub allowed_room: Option<String>,
    /// Maximum number of results, 1 to 200
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 200))]
    pub limit: i64,
    /// Number of results to skip
    #[serde(default)]
    pub offset: u64,
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            role: None,
            allowed_room: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> i64 {
    50
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.role.is_none_or(|role| user.role == role)
            && self
                .allowed_room
                .as_ref()
                .is_none_or(|room| user.allowed_room.as_ref() == Some(room))
    }
}
