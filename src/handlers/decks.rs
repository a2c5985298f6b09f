//! Deck-level endpoints: opening a review session and the due summary.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ApiError;
use crate::db::{self, LogOnError};
use crate::srs::{ReviewSession, SessionView, StoreError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StartResponse {
  pub session_id: String,
  pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct DueSummary {
  pub deck_id: i64,
  pub due_count: i64,
  /// When the next card becomes due, if none are due now
  pub next_review: Option<DateTime<Utc>>,
}

pub async fn start_session(
  State(state): State<AppState>,
  Path(deck_id): Path<i64>,
) -> Result<(StatusCode, Json<StartResponse>), ApiError> {
  let now = Utc::now();
  let session = ReviewSession::start(&state.store, state.scheduler.clone(), deck_id, now)?;
  let view = session.view();
  let session_id = state.sessions.insert(session, now)?;

  Ok((
    StatusCode::CREATED,
    Json(StartResponse {
      session_id,
      session: view,
    }),
  ))
}

pub async fn due_summary(
  State(state): State<AppState>,
  Path(deck_id): Path<i64>,
) -> Result<Json<DueSummary>, ApiError> {
  let now = Utc::now();
  let conn = db::try_lock(state.store.pool())?;

  let due_count = db::get_due_count(&conn, deck_id, now).map_err(StoreError::from)?;
  let next_review = if due_count == 0 {
    db::get_next_review_time(&conn, deck_id, now)
      .log_warn("Failed to get next review time")
      .flatten()
  } else {
    None
  };

  Ok(Json(DueSummary {
    deck_id,
    due_count,
    next_review,
  }))
}
