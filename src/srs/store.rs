//! The two record-store operations a review session depends on.

use chrono::{DateTime, Utc};

use crate::domain::Card;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),
  #[error("card store unavailable")]
  Unavailable,
  #[error("card {0} not found")]
  CardNotFound(i64),
}

impl StoreError {
  /// Whether the same write may succeed if tried again later.
  pub fn is_transient(&self) -> bool {
    match self {
      Self::Unavailable => true,
      Self::Database(rusqlite::Error::SqliteFailure(err, _)) => matches!(
        err.code,
        rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
      ),
      Self::Database(_) | Self::CardNotFound(_) => false,
    }
  }
}

/// Card record store shared across sessions.
///
/// Each `write_card_schedule` must be applied atomically per card. Two
/// sessions rating the same card race with last-write-wins semantics.
pub trait CardStore {
  /// Cards of `deck_id` with `next_review <= as_of`, in any order.
  fn fetch_due_cards(&self, deck_id: i64, as_of: DateTime<Utc>) -> Result<Vec<Card>, StoreError>;

  /// Partial update of the scheduling fields only.
  fn write_card_schedule(
    &self,
    card_id: i64,
    interval_days: u32,
    next_review: DateTime<Utc>,
  ) -> Result<(), StoreError>;
}
