pub mod cards;
pub mod schema;
pub mod store;

use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use cards::*;
pub use schema::run_migrations;
pub use store::SqliteStore;

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Database unavailable")]
pub struct DbLockError;

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
  pool.lock().map_err(|_: PoisonError<_>| {
    tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
    DbLockError
  })
}

pub fn init_db(path: &Path) -> Result<DbPool> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)
      .log_warn(&format!("Could not create database directory {}", parent.display()));
  }

  let conn = Connection::open(path)?;
  run_migrations(&conn)?;
  tracing::debug!("Database ready at {}", path.display());
  Ok(Arc::new(Mutex::new(conn)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_init_db_creates_parent_dirs() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("nested").join("dir").join("cards.db");

    let pool = init_db(&path).unwrap();
    assert!(path.exists());

    let conn = try_lock(&pool).unwrap();
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0)).unwrap();
    assert_eq!(count, 0);
  }

  #[test]
  fn test_log_warn() {
    let err: std::result::Result<i64, String> = Err("boom".into());
    assert_eq!(err.log_warn("ctx"), None);
  }
}
