//! Password hashing.

use core_config::{ConfigError, FromEnv, env_parse_or};

use crate::error::{UserError, UserResult};

/// bcrypt work factor used when `BCRYPT_COST` is not set.
pub const DEFAULT_COST: u32 = 10;
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// One-way salted password hashing.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `plaintext` with a fresh random salt.
    fn hash(&self, plaintext: &str) -> UserResult<String>;

    /// Check `plaintext` against a stored hash.
    fn verify(&self, plaintext: &str, hash: &str) -> UserResult<bool>;
}

/// bcrypt (`$2b$`) with a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> UserResult<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(UserError::Validation(format!(
                "bcrypt cost must be between {} and {}, got {}",
                MIN_COST, MAX_COST, cost
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plaintext: &str) -> UserResult<String> {
        bcrypt::hash(plaintext, self.cost).map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> UserResult<bool> {
        bcrypt::verify(plaintext, hash).map_err(|e| UserError::PasswordHash(e.to_string()))
    }
}

/// Hashing settings read from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    pub bcrypt_cost: u32,
}

impl PasswordConfig {
    pub fn hasher(&self) -> BcryptHasher {
        BcryptHasher {
            cost: self.bcrypt_cost,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: DEFAULT_COST,
        }
    }
}

impl FromEnv for PasswordConfig {
    /// - `BCRYPT_COST` (default: 10, range 4..=31)
    fn from_env() -> Result<Self, ConfigError> {
        let bcrypt_cost = env_parse_or("BCRYPT_COST", DEFAULT_COST)?;

        if !(MIN_COST..=MAX_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "BCRYPT_COST".to_string(),
                details: format!("must be between {} and {}", MIN_COST, MAX_COST),
            });
        }

        Ok(Self { bcrypt_cost })
    }
}
