//! Connection settings for the PostgreSQL event repository.

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Event store connection configuration.
///
/// Built once at startup and handed to
/// [`PostgresEventRepository::connect`](crate::PostgresEventRepository::connect).
///
/// Reads from environment variables:
/// - `DATABASE_URL` — PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS` — pool size (default: `5`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Loads configuration from the environment.
    ///
    /// Returns None when `DATABASE_URL` is not set.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty())?;
        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        Some(Self {
            database_url,
            max_connections,
        })
    }
}
