//! Runtime configuration.
//!
//! Values come from the environment with XDG-compliant defaults. The CLI
//! overrides individual fields from its flags.

use std::env;
use std::path::PathBuf;

use crate::db::{DbError, DbResult, DeletePolicy};

pub const ENV_DB_PATH: &str = "REVIEWDB_DB";
pub const ENV_DELETE_POLICY: &str = "REVIEWDB_ON_DELETE";
pub const ENV_MAX_CONNECTIONS: &str = "REVIEWDB_MAX_CONNECTIONS";

const DATA_DIR_NAME: &str = "reviewdb";
const DB_FILE_NAME: &str = "reviewdb.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Store configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Applied when deleting customers or items that still have reviews.
    pub delete_policy: DeletePolicy,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: get_db_path(),
            delete_policy: DeletePolicy::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> DbResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset or empty keys fall back to defaults; malformed values are
    /// rejected rather than silently ignored.
    pub fn from_lookup<F>(lookup: F) -> DbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(policy) = get(ENV_DELETE_POLICY) {
            config.delete_policy = policy
                .parse()
                .map_err(|message| DbError::Validation { message })?;
        }

        if let Some(max) = get(ENV_MAX_CONNECTIONS) {
            config.max_connections = max
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| DbError::Validation {
                    message: format!(
                        "{} must be a positive integer, got '{}'",
                        ENV_MAX_CONNECTIONS, max
                    ),
                })?;
        }

        Ok(config)
    }
}

/// Get XDG-compliant data directory for reviewdb.
///
/// Uses `$XDG_DATA_HOME/reviewdb`, then `$HOME/.local/share/reviewdb`, and
/// finally a relative `reviewdb` directory when neither variable is set.
pub fn get_data_dir() -> PathBuf {
    let data_home = env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|home| PathBuf::from(home).join(".local/share")))
        .unwrap_or_default();

    data_home.join(DATA_DIR_NAME)
}

/// Get database file path (data_dir/reviewdb.db).
pub fn get_db_path() -> PathBuf {
    get_data_dir().join(DB_FILE_NAME)
}
