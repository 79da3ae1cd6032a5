#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_first_of, env_parse_or};

/// Database used when neither the config nor the connection string names one.
pub const FALLBACK_DATABASE: &str = "test";

/// MongoDB connection settings
///
/// Construct it manually or load it from environment variables (with the
/// `config` feature).
///
/// # Example
///
/// ```ignore
/// use database::mongodb::MongoConfig;
///
/// let config = MongoConfig::new("mongodb://localhost:27017/rooms");
/// assert_eq!(config.database_name(), "rooms");
///
/// let config = MongoConfig::new("mongodb://localhost:27017").with_database("rooms");
/// ```
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// Connection string
    /// Format: mongodb://[username:password@]host[:port][/database][?options]
    pub url: String,

    /// Explicit database name; overrides the one in `url`
    pub database: Option<String>,

    /// Application name reported to the server
    pub app_name: Option<String>,

    pub max_pool_size: u32,
    pub min_pool_size: u32,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Server selection timeout in seconds
    pub server_selection_timeout_secs: u64,
}

impl MongoConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_pool_size(mut self, max_pool_size: u32, min_pool_size: u32) -> Self {
        self.max_pool_size = max_pool_size;
        self.min_pool_size = min_pool_size;
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Database to open: the explicit name, else the path segment of the
    /// connection string, else [`FALLBACK_DATABASE`].
    pub fn database_name(&self) -> String {
        self.database
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| database_from_url(&self.url))
            .unwrap_or_else(|| FALLBACK_DATABASE.to_string())
    }

    /// Connection string with the password replaced, safe to log.
    pub fn redacted_url(&self) -> String {
        let Some(scheme_end) = self.url.find("://") else {
            return self.url.clone();
        };
        let rest = &self.url[scheme_end + 3..];
        let authority_end = rest.find(['/', '?']).unwrap_or(rest.len());
        let authority = &rest[..authority_end];

        match authority.rfind('@') {
            Some(at) => {
                let credentials = &authority[..at];
                let user = credentials.split(':').next().unwrap_or_default();
                format!(
                    "{}{}:***{}",
                    &self.url[..scheme_end + 3],
                    user,
                    &rest[at..]
                )
            }
            None => self.url.clone(),
        }
    }
}

/// Extract `/database` from a connection string, ignoring the query.
fn database_from_url(url: &str) -> Option<String> {
    let rest = &url[url.find("://")? + 3..];
    let path = &rest[rest.find('/')? + 1..];
    let name = path.split('?').next().unwrap_or_default();
    (!name.is_empty()).then(|| name.to_string())
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            database: None,
            app_name: None,
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
        }
    }
}

/// Environment variables:
/// - `MONGODB_URL`, `MONGO_URL` or `MONGO_URI` (required)
/// - `MONGODB_DATABASE` or `MONGO_DATABASE` (optional, else taken from the URL)
/// - `MONGODB_APP_NAME` (optional)
/// - `MONGODB_MAX_POOL_SIZE` (default: 100)
/// - `MONGODB_MIN_POOL_SIZE` (default: 5)
/// - `MONGODB_CONNECT_TIMEOUT_SECS` (default: 10)
/// - `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` (default: 30)
#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_first_of(&["MONGODB_URL", "MONGO_URL", "MONGO_URI"]).ok_or_else(|| {
            ConfigError::MissingEnvVar("MONGODB_URL, MONGO_URL or MONGO_URI".to_string())
        })?;

        let defaults = Self::default();

        Ok(Self {
            url,
            database: env_first_of(&["MONGODB_DATABASE", "MONGO_DATABASE"]),
            app_name: std::env::var("MONGODB_APP_NAME").ok(),
            max_pool_size: env_parse_or("MONGODB_MAX_POOL_SIZE", defaults.max_pool_size)?,
            min_pool_size: env_parse_or("MONGODB_MIN_POOL_SIZE", defaults.min_pool_size)?,
            connect_timeout_secs: env_parse_or(
                "MONGODB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            server_selection_timeout_secs: env_parse_or(
                "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                defaults.server_selection_timeout_secs,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mongo_config_new() {
        let config = MongoConfig::new("mongodb://db:27017");
        assert_eq!(config.url(), "mongodb://db:27017");
        assert_eq!(config.database, None);
        assert_eq!(config.max_pool_size, 100);
        assert_eq!(config.min_pool_size, 5);
    }

    #[test]
    fn test_builder_methods() {
        let config = MongoConfig::new("mongodb://db:27017")
            .with_database("rooms")
            .with_pool_size(50, 10)
            .with_app_name("room-access-api");

        assert_eq!(config.database.as_deref(), Some("rooms"));
        assert_eq!(config.max_pool_size, 50);
        assert_eq!(config.min_pool_size, 10);
        assert_eq!(config.app_name.as_deref(), Some("room-access-api"));
    }

    #[test]
    fn test_database_name_resolution_order() {
        let explicit = MongoConfig::new("mongodb://db:27017/from_url").with_database("explicit");
        assert_eq!(explicit.database_name(), "explicit");

        let from_url = MongoConfig::new("mongodb://user:pw@db:27017/from_url?authSource=admin");
        assert_eq!(from_url.database_name(), "from_url");

        let fallback = MongoConfig::new("mongodb://db:27017/?retryWrites=true");
        assert_eq!(fallback.database_name(), FALLBACK_DATABASE);

        let bare = MongoConfig::new("mongodb+srv://cluster.example.net");
        assert_eq!(bare.database_name(), "test");
    }

    #[test]
    fn test_redacted_url_hides_password() {
        let config = MongoConfig::new("mongodb://admin:s3cret@db:27017/rooms?authSource=admin");
        let redacted = config.redacted_url();
        assert_eq!(redacted, "mongodb://admin:***@db:27017/rooms?authSource=admin");
        assert!(!redacted.contains("s3cret"));
    }

    #[test]
    fn test_redacted_url_without_credentials_is_unchanged() {
        let config = MongoConfig::new("mongodb://db:27017/rooms");
        assert_eq!(config.redacted_url(), "mongodb://db:27017/rooms");
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("MONGODB_DATABASE", Some("testdb")),
                ("MONGODB_MAX_POOL_SIZE", Some("20")),
            ],
            || {
                let config = MongoConfig::from_env().unwrap();
                assert_eq!(config.url, "mongodb://localhost:27017");
                assert_eq!(config.database_name(), "testdb");
                assert_eq!(config.max_pool_size, 20);
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env_mongo_uri_fallback() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", None::<&str>),
                ("MONGO_URL", None::<&str>),
                ("MONGO_URI", Some("mongodb://fallback:27017/campus")),
                ("MONGODB_DATABASE", None::<&str>),
                ("MONGO_DATABASE", None::<&str>),
            ],
            || {
                let config = MongoConfig::from_env().unwrap();
                assert_eq!(config.url, "mongodb://fallback:27017/campus");
                assert_eq!(config.database, None);
                assert_eq!(config.database_name(), "campus");
            },
        );
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env_missing_url() {
        temp_env::with_vars_unset(["MONGODB_URL", "MONGO_URL", "MONGO_URI"], || {
            let err = MongoConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvVar(_)));
        });
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_mongo_config_from_env_invalid_pool_size() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("MONGODB_MAX_POOL_SIZE", Some("lots")),
            ],
            || {
                let err = MongoConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("MONGODB_MAX_POOL_SIZE"));
            },
        );
    }
}
