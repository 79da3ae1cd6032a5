//! Users Domain
//!
//! User records for room access: a unique `userId`, a unique `secretKey`,
//! a bcrypt-hashed password, a [`Role`] and an optional allowed room.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, password guard
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs, enums
//! └─────────────┘
//! ```
//!
//! Every write goes through the save guard, which hashes the password only
//! when it differs from the stored value. Repositories accept nothing but
//! the resulting [`PreparedUser`]; outside this crate one can only be built
//! with [`User::prepare_insert`], which always hashes. Updates write only
//! the changed fields and `updatedAt`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{handlers, MongoUserRepository, UserService};
//!
//! # async fn example(db: mongodb::Database) -> Result<(), Box<dyn std::error::Error>> {
//! let repository = MongoUserRepository::new(db);
//! repository.init_indexes().await?;
//!
//! let router = handlers::router(UserService::new(repository));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod password;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateUser, PreparedUser, Role, UpdateUser, User, UserField, UserFilter, UserResponse,
};
pub use mongodb::MongoUserRepository;
pub use password::{BcryptHasher, PasswordConfig, PasswordHasher};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
