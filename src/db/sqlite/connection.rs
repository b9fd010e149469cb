//! SQLite database connection and schema management.

use std::path::Path;
use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::{debug, info};

use super::customer::SqliteCustomerRepository;
use super::item::SqliteItemRepository;
use super::review::SqliteReviewRepository;
use crate::config::Config;
use crate::db::{Database, DbError, DbResult, DeletePolicy};

// Embed the schema from data/sql/sqlite/ at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./data/sql/sqlite");

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// SQLite database implementation.
///
/// Provides access to repositories via associated types, avoiding dynamic dispatch.
pub struct SqliteDatabase {
    pool: SqlitePool,
    delete_policy: DeletePolicy,
}

impl SqliteDatabase {
    /// Open (creating if missing) a database file at the given path.
    pub async fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Self::open_with(path, DEFAULT_MAX_CONNECTIONS).await
    }

    async fn open_with<P: AsRef<Path>>(path: P, max_connections: u32) -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        debug!(path = %path.as_ref().display(), "opened sqlite database");
        Ok(Self {
            pool,
            delete_policy: DeletePolicy::default(),
        })
    }

    /// Create an in-memory database (useful for testing).
    ///
    /// Every pooled connection to `:memory:` would see its own empty database,
    /// so the pool is pinned to one connection that is never recycled.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self {
            pool,
            delete_policy: DeletePolicy::default(),
        })
    }

    /// Open the database described by `config` and apply its delete policy.
    pub async fn connect(config: &Config) -> DbResult<Self> {
        let db = Self::open_with(&config.db_path, config.max_connections).await?;
        Ok(db.with_delete_policy(config.delete_policy))
    }

    /// Replace the policy applied when deleting customers or items with reviews.
    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    /// Direct access to the pool, for tests and ad-hoc queries.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Database for SqliteDatabase {
    type Customers<'a> = SqliteCustomerRepository<'a>;
    type Items<'a> = SqliteItemRepository<'a>;
    type Reviews<'a> = SqliteReviewRepository<'a>;

    async fn migrate(&self) -> DbResult<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Migration {
                message: e.to_string(),
            })?;

        info!("database schema is up to date");
        Ok(())
    }

    fn customers(&self) -> Self::Customers<'_> {
        SqliteCustomerRepository {
            pool: &self.pool,
            delete_policy: self.delete_policy,
        }
    }

    fn items(&self) -> Self::Items<'_> {
        SqliteItemRepository {
            pool: &self.pool,
            delete_policy: self.delete_policy,
        }
    }

    fn reviews(&self) -> Self::Reviews<'_> {
        SqliteReviewRepository { pool: &self.pool }
    }
}
