//! Review session over a deck's due cards.
//!
//! The queue is fixed when the session starts. Each slot moves
//! `Unseen -> Revealed -> Rated`; the session is complete once the cursor
//! reaches the end of the queue. Only [`ReviewSession::start`] and
//! [`ReviewSession::rate`] touch the store; every other operation is
//! in-memory.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::scheduler::{IntervalPreview, ScheduleResult, Scheduler};
use super::store::{CardStore, StoreError};
use crate::domain::{Card, Rating, RatingScale};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
  Unseen,
  Revealed,
  Rated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
  InProgress,
  Complete,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
  #[error("session is already complete")]
  Complete,
  #[error("the answer must be revealed before rating")]
  NotRevealed,
  #[error("could not save the review, please try again: {0}")]
  Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
struct Slot {
  card: Card,
  state: SlotState,
}

#[derive(Debug, Clone)]
pub struct ReviewSession {
  deck_id: i64,
  scheduler: Scheduler,
  queue: Vec<Slot>,
  cursor: usize,
  skips: usize,
}

impl ReviewSession {
  /// Fetch the deck's due cards and open a session over them.
  pub fn start(
    store: &impl CardStore,
    scheduler: Scheduler,
    deck_id: i64,
    now: DateTime<Utc>,
  ) -> Result<Self, SessionError> {
    let cards = store.fetch_due_cards(deck_id, now)?;
    Ok(Self::from_cards(scheduler, deck_id, cards, now))
  }

  /// Build a session from an already fetched card set.
  ///
  /// Cards not due at `now` are dropped. The rest are ordered earliest
  /// `next_review` first so the most neglected cards come up first.
  pub fn from_cards(scheduler: Scheduler, deck_id: i64, cards: Vec<Card>, now: DateTime<Utc>) -> Self {
    let mut cards: Vec<Card> = cards.into_iter().filter(|c| c.is_due(now)).collect();
    cards.sort_by(|a, b| a.next_review.cmp(&b.next_review).then(a.id.cmp(&b.id)));

    let queue: Vec<Slot> = cards
      .into_iter()
      .map(|card| Slot {
        card,
        state: SlotState::Unseen,
      })
      .collect();

    tracing::info!(deck_id, due = queue.len(), "review session started");

    Self {
      deck_id,
      scheduler,
      queue,
      cursor: 0,
      skips: 0,
    }
  }

  pub fn deck_id(&self) -> i64 {
    self.deck_id
  }

  pub fn status(&self) -> SessionStatus {
    if self.cursor >= self.queue.len() {
      SessionStatus::Complete
    } else {
      SessionStatus::InProgress
    }
  }

  pub fn is_complete(&self) -> bool {
    self.status() == SessionStatus::Complete
  }

  pub fn total(&self) -> usize {
    self.queue.len()
  }

  pub fn remaining(&self) -> usize {
    self.queue.len() - self.cursor
  }

  pub fn rated_count(&self) -> usize {
    self.queue.iter().filter(|s| s.state == SlotState::Rated).count()
  }

  pub fn skipped_count(&self) -> usize {
    self.skips
  }

  pub fn current_card(&self) -> Option<&Card> {
    self.queue.get(self.cursor).map(|s| &s.card)
  }

  pub fn current_state(&self) -> Option<SlotState> {
    self.queue.get(self.cursor).map(|s| s.state)
  }

  pub fn is_revealed(&self) -> bool {
    self.current_state() == Some(SlotState::Revealed)
  }

  fn current_slot_mut(&mut self) -> Result<&mut Slot, SessionError> {
    self.queue.get_mut(self.cursor).ok_or(SessionError::Complete)
  }

  /// Show the current answer. Calling it again changes nothing.
  pub fn reveal(&mut self) -> Result<(), SessionError> {
    let slot = self.current_slot_mut()?;
    slot.state = SlotState::Revealed;
    Ok(())
  }

  /// Toggle the current answer between hidden and shown.
  pub fn flip(&mut self) -> Result<SlotState, SessionError> {
    let slot = self.current_slot_mut()?;
    slot.state = match slot.state {
      SlotState::Revealed => SlotState::Unseen,
      _ => SlotState::Revealed,
    };
    Ok(slot.state)
  }

  /// Schedule the current card, persist it, then advance.
  ///
  /// If the write fails nothing changes: the card stays revealed at the
  /// cursor so the same call can be retried.
  pub fn rate(
    &mut self,
    store: &impl CardStore,
    rating: Rating,
    now: DateTime<Utc>,
  ) -> Result<ScheduleResult, SessionError> {
    let slot = self.queue.get(self.cursor).ok_or(SessionError::Complete)?;
    if slot.state != SlotState::Revealed {
      return Err(SessionError::NotRevealed);
    }

    let card_id = slot.card.id;
    let result = self.scheduler.compute_next(slot.card.interval_days, rating, now);

    if let Err(e) = store.write_card_schedule(card_id, result.interval_days, result.next_review) {
      tracing::warn!(card_id, "failed to save review: {}", e);
      return Err(e.into());
    }

    let slot = &mut self.queue[self.cursor];
    slot.card.interval_days = result.interval_days;
    slot.card.next_review = result.next_review;
    slot.state = SlotState::Rated;
    self.cursor += 1;

    tracing::debug!(
      card_id,
      rating = %rating.label(),
      interval_days = result.interval_days,
      "card rated"
    );
    if self.is_complete() {
      tracing::info!(deck_id = self.deck_id, rated = self.rated_count(), "review session complete");
    }

    Ok(result)
  }

  /// Put the current card off until later in this session.
  ///
  /// With more than one card left, the current card rotates to the back of
  /// the queue. If it is the last card, the session ends without scheduling
  /// it, so it stays due for next time.
  pub fn skip(&mut self) -> Result<(), SessionError> {
    let remaining = self.remaining();
    let slot = self.current_slot_mut()?;
    slot.state = SlotState::Unseen;
    let card_id = slot.card.id;
    self.skips += 1;

    if remaining > 1 {
      self.queue[self.cursor..].rotate_left(1);
      tracing::debug!(card_id, "card skipped");
    } else {
      self.cursor = self.queue.len();
      tracing::info!(deck_id = self.deck_id, card_id, "last card skipped, review session complete");
    }
    Ok(())
  }

  /// Go through the same fetched cards again from the top.
  ///
  /// Cards keep whatever schedule was already written during this session.
  pub fn restart(&mut self) {
    for slot in &mut self.queue {
      slot.state = SlotState::Unseen;
    }
    self.cursor = 0;
    self.skips = 0;
    tracing::debug!(deck_id = self.deck_id, total = self.queue.len(), "review session restarted");
  }

  pub fn view(&self) -> SessionView {
    let revealed = self.is_revealed();
    let current = self.current_card().map(|card| CurrentCardView {
      id: card.id,
      front_text: card.front_text.clone(),
      back_text: revealed.then(|| card.back_text.clone()),
      revealed,
      interval_days: card.interval_days,
      next_review: card.next_review,
      coarse_preview: self.scheduler.preview(card.interval_days, RatingScale::Coarse),
      fine_preview: self.scheduler.preview(card.interval_days, RatingScale::Fine),
    });

    SessionView {
      deck_id: self.deck_id,
      status: self.status(),
      total: self.total(),
      position: self.cursor,
      remaining: self.remaining(),
      rated: self.rated_count(),
      skipped: self.skipped_count(),
      current,
    }
  }
}

/// Snapshot of a session for callers that render it.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
  pub deck_id: i64,
  pub status: SessionStatus,
  pub total: usize,
  pub position: usize,
  pub remaining: usize,
  pub rated: usize,
  pub skipped: usize,
  pub current: Option<CurrentCardView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentCardView {
  pub id: i64,
  pub front_text: String,
  /// Only present once the answer is revealed.
  pub back_text: Option<String>,
  pub revealed: bool,
  pub interval_days: u32,
  pub next_review: DateTime<Utc>,
  pub coarse_preview: Vec<IntervalPreview>,
  pub fine_preview: Vec<IntervalPreview>,
}
