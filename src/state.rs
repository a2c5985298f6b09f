//! Application state shared by all handlers.

use std::sync::Arc;

use crate::config;
use crate::db::{DbPool, SqliteStore};
use crate::session::SessionRegistry;
use crate::srs::Scheduler;

#[derive(Clone)]
pub struct AppState {
    /// Card record store (shared across all sessions)
    pub store: SqliteStore,

    /// Live review sessions
    pub sessions: Arc<SessionRegistry>,

    /// Scheduler handed to each new session
    pub scheduler: Scheduler,
}

impl AppState {
    pub fn new(pool: DbPool, scheduler: Scheduler, session_expiry_hours: i64) -> Self {
        Self {
            store: SqliteStore::new(pool),
            sessions: Arc::new(SessionRegistry::new(session_expiry_hours, config::MAX_LIVE_SESSIONS)),
            scheduler,
        }
    }
}
