//! Configuration for the SQLite connection pool
//!
//! Provides a builder pattern for configuring how mappings reach the store.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::{DaoError, Result};

/// URL of a private in-memory database
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Configuration for the store connection
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite database URL (`sqlite://path/to/file.db` or `sqlite::memory:`)
    pub database_url: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Create the database file when it does not exist
    pub create_if_missing: bool,
    /// How long a connection waits on a locked database before failing
    pub busy_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration builder
    pub fn builder(database_url: impl Into<String>) -> StoreConfigBuilder {
        StoreConfigBuilder::new(database_url)
    }

    /// Configuration for a private in-memory database.
    ///
    /// Every SQLite connection to `:memory:` opens its own database, so the
    /// pool is pinned to a single connection that is never recycled.
    pub fn in_memory() -> Self {
        StoreConfigBuilder::new(IN_MEMORY_URL)
            .max_connections(1)
            .build()
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    /// Open a connection pool for this configuration
    pub async fn connect(&self) -> Result<SqlitePool> {
        let options = SqliteConnectOptions::from_str(&self.database_url)
            .map_err(|e| DaoError::configuration(format!("Invalid database URL: {}", e)))?
            .create_if_missing(self.create_if_missing)
            .busy_timeout(self.busy_timeout);

        let mut pool_options = SqlitePoolOptions::new().max_connections(self.max_connections);
        if self.is_in_memory() {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await.map_err(|e| {
            DaoError::Connection(format!("Database connection failed: {}", e))
        })?;
        tracing::debug!(
            database_url = %self.database_url,
            max_connections = self.max_connections,
            "connected to store"
        );
        Ok(pool)
    }
}

/// Builder for StoreConfig
#[derive(Debug)]
pub struct StoreConfigBuilder {
    database_url: String,
    max_connections: u32,
    create_if_missing: bool,
    busy_timeout: Duration,
}

impl StoreConfigBuilder {
    /// Create a new builder with the database URL
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 5,
            create_if_missing: true,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Set the maximum pool size (default: 5)
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Enable or disable creating a missing database file (default: true)
    pub fn create_if_missing(mut self, enabled: bool) -> Self {
        self.create_if_missing = enabled;
        self
    }

    /// Set the busy timeout (default: 5 seconds)
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Build the configuration
    pub fn build(self) -> StoreConfig {
        StoreConfig {
            database_url: self.database_url,
            max_connections: self.max_connections.max(1),
            create_if_missing: self.create_if_missing,
            busy_timeout: self.busy_timeout,
        }
    }
}
