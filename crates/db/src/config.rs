/// Default maximum number of pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Default timeout for acquiring a connection from the pool, in seconds.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Store configuration loaded from environment variables.
///
/// All tuning fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Maximum pooled connections (default: `20`).
    pub max_connections: u32,
    /// Pool acquire timeout in seconds (default: `30`).
    pub acquire_timeout_secs: u64,
}

impl DbConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                      | Default    |
    /// |------------------------------|------------|
    /// | `DATABASE_URL`               | (required) |
    /// | `STORE_MAX_CONNECTIONS`      | `20`       |
    /// | `STORE_ACQUIRE_TIMEOUT_SECS` | `30`       |
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let max_connections: u32 = std::env::var("STORE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| DEFAULT_MAX_CONNECTIONS.to_string())
            .parse()
            .expect("STORE_MAX_CONNECTIONS must be a valid u32");

        let acquire_timeout_secs: u64 = std::env::var("STORE_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse()
            .expect("STORE_ACQUIRE_TIMEOUT_SECS must be a valid u64");

        Self {
            database_url,
            max_connections,
            acquire_timeout_secs,
        }
    }
}
