//! # Database Handle
//!
//! One SQLite file per venue. The console opens it per command and the
//! `watch` loop keeps it open while other console processes write to the
//! same file, so every connection waits on a busy lock instead of failing.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lanhouse start PC-03 ...  ──┐                                          │
//! │  lanhouse checkout PC-03 ────┼──► lanhouse.db (WAL)                     │
//! │  lanhouse watch ─────────────┘         ▲                                │
//! │                                        └── migrations/sqlite (embedded) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tests use [`DbConfig::in_memory`]: a private database on a single
//! connection, migrated on open like the real file.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::cash_flow::CashFlowRepository;
use crate::repository::client::ClientRepository;
use crate::repository::floor::FloorRepository;
use crate::repository::product::ProductRepository;
use crate::repository::rate::RateRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::station::StationRepository;

/// Schema, embedded at compile time from `migrations/sqlite`.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// How long a write waits for another console process to release the file.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the venue database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub path: PathBuf,
    /// A console runs one command at a time; two connections let the
    /// watch loop read while a transaction is open.
    pub max_connections: u32,
}

impl DbConfig {
    /// A database file, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: path.into(),
            max_connections: 2,
        }
    }

    /// A private in-memory database.
    ///
    /// Each SQLite connection to `:memory:` is its own database, so the
    /// pool is pinned to one connection.
    pub fn in_memory() -> Self {
        DbConfig {
            path: PathBuf::from(":memory:"),
            max_connections: 1,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == ":memory:"
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = SqliteConnectOptions::new()
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        if self.is_in_memory() {
            options.in_memory(true)
        } else {
            options
                .filename(&self.path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        }
    }
}

/// Open venue database; hands out repositories over a shared pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (or creates) the database and applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.path.display(), "Opening venue database");

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
        if config.is_in_memory() {
            // Dropping the last connection would drop the database
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::Open(e.to_string()))?;

        MIGRATOR.run(&pool).await?;
        debug!(migrations = MIGRATOR.migrations.len(), "Schema up to date");

        Ok(Database { pool })
    }

    /// Raw pool, for the transactional helpers and tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn stations(&self) -> StationRepository {
        StationRepository::new(self.pool.clone())
    }

    pub fn rates(&self) -> RateRepository {
        RateRepository::new(self.pool.clone())
    }

    pub fn clients(&self) -> ClientRepository {
        ClientRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    pub fn cash_flow(&self) -> CashFlowRepository {
        CashFlowRepository::new(self.pool.clone())
    }

    /// Multi-table writes for session start and checkout.
    pub fn floor(&self) -> FloorRepository {
        FloorRepository::new(self.pool.clone())
    }

    /// Waits for open connections to finish and closes the pool.
    pub async fn close(&self) {
        debug!("Closing venue database");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(applied as usize, MIGRATOR.migrations.len());

        assert!(db.stations().list().await.unwrap().is_empty());
        assert!(db.cash_flow().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_one_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let other = db.clone();

        other
            .stations()
            .insert(&lanhouse_core::Station::new(
                "PC-01",
                "PC 01",
                lanhouse_core::StationKind::Pc,
                "pc",
            ))
            .await
            .unwrap();

        assert_eq!(db.stations().list().await.unwrap().len(), 1);
    }

    #[test]
    fn test_config_paths() {
        assert!(DbConfig::in_memory().is_in_memory());
        assert_eq!(DbConfig::in_memory().max_connections, 1);

        let file = DbConfig::new("/tmp/lanhouse.db");
        assert!(!file.is_in_memory());
        assert_eq!(file.max_connections, 2);
    }
}
