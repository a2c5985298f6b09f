//! Test utilities for database setup.
//!
//! Reuses the real migrations so tests never carry their own copy of the
//! schema.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::db::{self, SqliteStore};
use crate::domain::{Card, Deck};

/// Migrated database file inside a temporary directory.
///
/// The directory (and the database) is removed when the value is dropped.
pub struct TestEnv {
    /// Kept alive so the database file persists for the test's duration
    pub temp: TempDir,
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("flashdeck.db"))?;
        db::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Insert a deck and return its id.
    pub fn deck(&self, name: &str) -> i64 {
        db::insert_deck(&self.conn, &Deck::new(name.to_string(), Utc::now())).expect("insert deck")
    }

    /// Insert a card with the given scheduling state and return its id.
    pub fn card(&self, deck_id: i64, front: &str, interval_days: u32, next_review: DateTime<Utc>) -> i64 {
        let mut card = Card::new(deck_id, front.to_string(), format!("{front} (back)"), next_review);
        card.interval_days = interval_days;
        db::insert_card(&self.conn, &card).expect("insert card")
    }

    /// Store over a second connection to the same database file.
    pub fn store(&self) -> SqliteStore {
        let conn = Connection::open(self.path().join("flashdeck.db")).expect("open store connection");
        SqliteStore::new(Arc::new(Mutex::new(conn)))
    }
}
