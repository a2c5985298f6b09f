//! JSON error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbLockError;
use crate::domain::RatingError;
use crate::session::RegistryError;
use crate::srs::{SessionError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error(transparent)]
  Session(#[from] SessionError),
  #[error(transparent)]
  Store(#[from] StoreError),
  #[error(transparent)]
  Rating(#[from] RatingError),
  #[error(transparent)]
  Registry(#[from] RegistryError),
  #[error("{0}")]
  BadRequest(String),
}

impl From<DbLockError> for ApiError {
  fn from(_: DbLockError) -> Self {
    Self::Store(StoreError::Unavailable)
  }
}

fn store_status(err: &StoreError) -> StatusCode {
  match err {
    _ if err.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
    // The card is gone; the client can skip it.
    StoreError::CardNotFound(_) => StatusCode::CONFLICT,
    _ => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::Session(SessionError::Store(err)) | Self::Store(err) => store_status(err),
      Self::Session(_) => StatusCode::CONFLICT,
      Self::Rating(_) | Self::BadRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
      Self::Registry(RegistryError::NotFound) => StatusCode::NOT_FOUND,
      Self::Registry(RegistryError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
    }
  }

  /// Whether repeating the same request may succeed.
  pub fn retryable(&self) -> bool {
    self.status() == StatusCode::SERVICE_UNAVAILABLE
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::warn!("Request failed: {}", self);
    } else {
      tracing::debug!("Request rejected: {}", self);
    }

    let body = json!({
      "error": self.to_string(),
      "retryable": self.retryable(),
    });
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_mapping() {
    assert_eq!(ApiError::from(SessionError::NotRevealed).status(), StatusCode::CONFLICT);
    assert_eq!(ApiError::from(SessionError::Complete).status(), StatusCode::CONFLICT);
    assert_eq!(
      ApiError::from(SessionError::Store(StoreError::Unavailable)).status(),
      StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
      ApiError::from(RatingError::QualityOutOfRange(9)).status(),
      StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(ApiError::from(RegistryError::NotFound).status(), StatusCode::NOT_FOUND);
    assert_eq!(ApiError::from(DbLockError).status(), StatusCode::SERVICE_UNAVAILABLE);
  }

  #[test]
  fn test_store_error_mapping() {
    let busy = || {
      StoreError::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
        None,
      ))
    };
    let cases = [
      (StoreError::Unavailable, StatusCode::SERVICE_UNAVAILABLE, true),
      (busy(), StatusCode::SERVICE_UNAVAILABLE, true),
      (StoreError::CardNotFound(1), StatusCode::CONFLICT, false),
      (
        StoreError::Database(rusqlite::Error::InvalidColumnType(5, "next_review".into(), rusqlite::types::Type::Null)),
        StatusCode::INTERNAL_SERVER_ERROR,
        false,
      ),
    ];

    for (err, status, retryable) in cases {
      let msg = err.to_string();
      let api = ApiError::from(SessionError::Store(err));
      assert_eq!(api.status(), status, "{msg}");
      assert_eq!(api.retryable(), retryable, "{msg}");
    }
  }

  #[test]
  fn test_direct_store_errors_share_mapping() {
    assert_eq!(ApiError::from(StoreError::CardNotFound(9)).status(), StatusCode::CONFLICT);
    assert!(!ApiError::from(StoreError::CardNotFound(9)).retryable());
    assert!(ApiError::from(StoreError::Unavailable).retryable());
  }

  #[test]
  fn test_contract_violations_are_not_retryable() {
    assert!(!ApiError::from(SessionError::NotRevealed).retryable());
    assert!(!ApiError::from(SessionError::Complete).retryable());
    assert!(!ApiError::BadRequest("x".into()).retryable());
  }
}
