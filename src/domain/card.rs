use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
  pub id: i64,
  pub name: String,
  pub created_at: DateTime<Utc>,
}

impl Deck {
  pub fn new(name: String, now: DateTime<Utc>) -> Self {
    Self {
      id: 0,
      name,
      created_at: now,
    }
  }
}

/// A flashcard and its scheduling state.
///
/// `interval_days` and `next_review` are only ever written together, from a
/// single scheduler result, so a card's due-ness always matches its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
  pub id: i64,
  pub deck_id: i64,
  pub front_text: String,
  pub back_text: String,
  /// Days between reviews. 0 means the card was never reviewed successfully.
  pub interval_days: u32,
  pub next_review: DateTime<Utc>,
}

impl Card {
  /// New cards start with no interval and are due immediately.
  pub fn new(deck_id: i64, front_text: String, back_text: String, now: DateTime<Utc>) -> Self {
    Self {
      id: 0,
      deck_id,
      front_text,
      back_text,
      interval_days: 0,
      next_review: now,
    }
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.next_review <= now
  }
}
