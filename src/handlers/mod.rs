pub mod decks;
pub mod error;
pub mod sessions;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use decks::{due_summary, start_session};
pub use error::ApiError;
pub use sessions::{abandon, flip, get_session, rate, restart, reveal, skip};

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/decks/{deck_id}/sessions", post(start_session))
    .route("/decks/{deck_id}/due", get(due_summary))
    .route("/sessions/{id}", get(get_session).delete(abandon))
    .route("/sessions/{id}/reveal", post(reveal))
    .route("/sessions/{id}/flip", post(flip))
    .route("/sessions/{id}/rate", post(rate))
    .route("/sessions/{id}/skip", post(skip))
    .route("/sessions/{id}/restart", post(restart))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
