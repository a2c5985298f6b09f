//! SQLite-backed [`CardStore`].

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::sync::MutexGuard;

use super::{cards, try_lock, DbPool};
use crate::domain::Card;
use crate::srs::{CardStore, StoreError};

#[derive(Clone)]
pub struct SqliteStore {
  pool: DbPool,
}

impl SqliteStore {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &DbPool {
    &self.pool
  }

  fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
    try_lock(&self.pool).map_err(|_| StoreError::Unavailable)
  }
}

impl CardStore for SqliteStore {
  fn fetch_due_cards(&self, deck_id: i64, as_of: DateTime<Utc>) -> Result<Vec<Card>, StoreError> {
    let conn = self.conn()?;
    Ok(cards::get_due_cards(&conn, deck_id, as_of)?)
  }

  /// One UPDATE statement, so each write is atomic per card and concurrent
  /// writers to the same card resolve as last write wins.
  fn write_card_schedule(
    &self,
    card_id: i64,
    interval_days: u32,
    next_review: DateTime<Utc>,
  ) -> Result<(), StoreError> {
    let conn = self.conn()?;
    match cards::update_card_schedule(&conn, card_id, interval_days, next_review)? {
      0 => Err(StoreError::CardNotFound(card_id)),
      _ => Ok(()),
    }
  }
}
