//! Review session endpoints. Each one is a thin wrapper over a
//! [`ReviewSession`] operation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::domain::Rating;
use crate::session::RegistryError;
use crate::srs::{ReviewSession, ScheduleResult, SessionView};
use crate::state::AppState;

/// Either `{"rating": "good"}` (coarse) or `{"quality": 4}` (fine).
#[derive(Debug, Deserialize)]
pub struct RateRequest {
  pub rating: Option<String>,
  pub quality: Option<u8>,
}

impl RateRequest {
  pub fn to_rating(&self) -> Result<Rating, ApiError> {
    match (&self.rating, self.quality) {
      (Some(name), None) => Ok(Rating::Coarse(name.parse()?)),
      (None, Some(quality)) => Ok(Rating::quality(quality)?),
      _ => Err(ApiError::BadRequest(
        "provide exactly one of \"rating\" or \"quality\"".to_string(),
      )),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
  pub result: ScheduleResult,
  pub session: SessionView,
}

fn with_session<R>(
  state: &AppState,
  id: &str,
  f: impl FnOnce(&mut ReviewSession, DateTime<Utc>) -> Result<R, ApiError>,
) -> Result<R, ApiError> {
  let now = Utc::now();
  let shared = state.sessions.get(id, now)?;
  let mut session = match shared.lock() {
    Ok(session) => session,
    Err(_) => {
      // A panic mid-operation leaves the session unusable for good.
      tracing::error!("Review session {} lock poisoned, dropping it", id);
      state.sessions.remove(id)?;
      return Err(RegistryError::NotFound.into());
    }
  };
  f(&mut session, now)
}

pub async fn get_session(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
  with_session(&state, &id, |session, _| Ok(session.view())).map(Json)
}

pub async fn reveal(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
  with_session(&state, &id, |session, _| {
    session.reveal()?;
    Ok(session.view())
  })
  .map(Json)
}

pub async fn flip(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
  with_session(&state, &id, |session, _| {
    session.flip()?;
    Ok(session.view())
  })
  .map(Json)
}

pub async fn rate(
  State(state): State<AppState>,
  Path(id): Path<String>,
  Json(request): Json<RateRequest>,
) -> Result<Json<RateResponse>, ApiError> {
  let rating = request.to_rating()?;
  with_session(&state, &id, |session, now| {
    let result = session.rate(&state.store, rating, now)?;
    Ok(RateResponse {
      result,
      session: session.view(),
    })
  })
  .map(Json)
}

pub async fn skip(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
  with_session(&state, &id, |session, _| {
    session.skip()?;
    Ok(session.view())
  })
  .map(Json)
}

pub async fn restart(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
  with_session(&state, &id, |session, _| {
    session.restart();
    Ok(session.view())
  })
  .map(Json)
}

/// Abandon a session. Cards keep whatever was already rated.
pub async fn abandon(
  State(state): State<AppState>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
  if state.sessions.remove(&id)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(RegistryError::NotFound.into())
  }
}
