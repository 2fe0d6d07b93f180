use crate::config::AppConfig;
use crate::errors::ServiceError;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Connection string for the ephemeral fallback store. The database lives in
/// process memory and disappears on restart.
const EPHEMERAL_DATABASE_URL: &str = "sqlite::memory:";

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Idle timeout duration
    pub idle_timeout: Duration,
    /// Acquire connection timeout
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 16,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.durable_database_url().unwrap_or_default().to_string(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

/// Establishes the connection pool selected by configuration: the durable
/// backend when a connection string is present, otherwise the ephemeral
/// in-memory store.
pub async fn establish_connection(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    match cfg.durable_database_url() {
        Some(_) => {
            let db_cfg: DbConfig = cfg.into();
            establish_connection_with_config(&db_cfg).await
        }
        None => {
            warn!("No store connection configured; using an ephemeral in-memory store. Data will NOT survive a restart.");
            connect_ephemeral().await
        }
    }
}

/// Establishes a connection pool to the durable database with custom
/// configuration.
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!("Configuring database connection with: {:?}", config);

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(true);

    info!(
        "Connecting to database with max_connections={}",
        config.max_connections
    );

    let db_pool = Database::connect(opt).await.map_err(|e| {
        error!("Database connection establishment failed: {}", e);
        ServiceError::DatabaseError(e)
    })?;

    info!("Database connection pool established successfully");

    Ok(db_pool)
}

/// Connects to the ephemeral in-memory store.
pub async fn connect_ephemeral() -> Result<DbPool, ServiceError> {
    let mut opt = ConnectOptions::new(EPHEMERAL_DATABASE_URL);
    // A single connection keeps the shared in-memory database alive; a pool
    // of independent connections would each see an empty database.
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    Database::connect(opt)
        .await
        .map_err(ServiceError::DatabaseError)
}

/// Runs database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    info!("Running database migrations");
    let start = std::time::Instant::now();

    let result = crate::migrator::Migrator::up(pool, None)
        .await
        .map_err(ServiceError::DatabaseError);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!(
            "Database migrations completed successfully in {:?}",
            elapsed
        ),
        Err(e) => error!("Database migrations failed after {:?}: {}", elapsed, e),
    }

    result
}

/// Checks if the database connection is active
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    pool.ping().await.map_err(ServiceError::DatabaseError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ephemeral_store_connects_and_migrates() {
        let pool = connect_ephemeral().await.expect("ephemeral store connects");
        run_migrations(&pool).await.expect("migrations run");
        assert!(check_connection(&pool).await.is_ok());
    }

    #[test]
    fn db_config_derived_from_app_config() {
        let mut cfg = AppConfig::default();
        cfg.database_url = Some("postgres://localhost/orders".into());
        cfg.db_max_connections = 4;

        let db_cfg: DbConfig = (&cfg).into();
        assert_eq!(db_cfg.url, "postgres://localhost/orders");
        assert_eq!(db_cfg.max_connections, 4);
    }
}
