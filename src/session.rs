//! In-memory registry of live review sessions.
//!
//! Sessions are keyed by a random id handed to the client. Entries expire
//! after a configurable period of inactivity; expired entries are swept
//! opportunistically on access, and always once the registry is full. A full
//! registry with nothing expired evicts its least recently used session.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config;
use crate::srs::ReviewSession;

pub type SharedSession = Arc<Mutex<ReviewSession>>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
  #[error("session not found or expired")]
  NotFound,
  #[error("session store unavailable")]
  Unavailable,
}

/// Session entry with last access time for expiration
struct SessionEntry {
  session: SharedSession,
  last_access: DateTime<Utc>,
}

pub struct SessionRegistry {
  sessions: Mutex<HashMap<String, SessionEntry>>,
  expiry: Duration,
  capacity: usize,
}

impl SessionRegistry {
  pub fn new(expiry_hours: i64, capacity: usize) -> Self {
    Self {
      sessions: Mutex::new(HashMap::new()),
      expiry: Duration::hours(expiry_hours),
      capacity: capacity.max(1),
    }
  }

  fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, SessionEntry>>, RegistryError> {
    self.sessions.lock().map_err(|_| {
      tracing::error!("Session registry lock poisoned");
      RegistryError::Unavailable
    })
  }

  /// Register a new session and return its id.
  pub fn insert(&self, session: ReviewSession, now: DateTime<Utc>) -> Result<String, RegistryError> {
    let mut sessions = self.lock()?;
    if sessions.len() >= self.capacity {
      self.sweep(&mut sessions, now);
    } else {
      self.maybe_cleanup(&mut sessions, now);
    }
    while sessions.len() >= self.capacity {
      evict_least_recent(&mut sessions);
    }

    let deck_id = session.deck_id();
    let mut id = generate_session_id();
    while sessions.contains_key(&id) {
      id = generate_session_id();
    }
    sessions.insert(
      id.clone(),
      SessionEntry {
        session: Arc::new(Mutex::new(session)),
        last_access: now,
      },
    );
    tracing::debug!(deck_id, live = sessions.len(), "review session registered");
    Ok(id)
  }

  /// Look up a live session and mark it as accessed.
  pub fn get(&self, id: &str, now: DateTime<Utc>) -> Result<SharedSession, RegistryError> {
    let mut sessions = self.lock()?;
    self.maybe_cleanup(&mut sessions, now);

    let entry = sessions.get_mut(id).ok_or(RegistryError::NotFound)?;
    if now - entry.last_access > self.expiry {
      sessions.remove(id);
      return Err(RegistryError::NotFound);
    }
    entry.last_access = now;
    Ok(entry.session.clone())
  }

  /// Drop a session. Returns false if there was nothing to drop.
  pub fn remove(&self, id: &str) -> Result<bool, RegistryError> {
    Ok(self.lock()?.remove(id).is_some())
  }

  pub fn len(&self) -> usize {
    self.lock().map(|s| s.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  // Clean up expired sessions occasionally (~10% chance)
  fn maybe_cleanup(&self, sessions: &mut HashMap<String, SessionEntry>, now: DateTime<Utc>) {
    if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
      self.sweep(sessions, now);
    }
  }

  fn sweep(&self, sessions: &mut HashMap<String, SessionEntry>, now: DateTime<Utc>) -> usize {
    let before = sessions.len();
    let cutoff = now - self.expiry;
    sessions.retain(|_, entry| entry.last_access >= cutoff);
    let removed = before - sessions.len();
    if removed > 0 {
      tracing::debug!("Expired {} idle review sessions", removed);
    }
    removed
  }
}

fn evict_least_recent(sessions: &mut HashMap<String, SessionEntry>) {
  let oldest = sessions
    .iter()
    .min_by_key(|(_, entry)| entry.last_access)
    .map(|(id, _)| id.clone());
  if let Some(id) = oldest {
    sessions.remove(&id);
    tracing::warn!("Session registry full, evicted least recently used session");
  }
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..config::SESSION_ID_LEN)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::srs::Scheduler;
  use chrono::TimeZone;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 1, 12, 0, 0).unwrap()
  }

  fn empty_session() -> ReviewSession {
    ReviewSession::from_cards(Scheduler::default(), 1, Vec::new(), now())
  }

  #[test]
  fn test_generate_session_id_shape() {
    let id = generate_session_id();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    assert_ne!(id, generate_session_id());
  }

  #[test]
  fn test_insert_and_get() {
    let registry = SessionRegistry::new(1, 16);
    let id = registry.insert(empty_session(), now()).unwrap();

    let session = registry.get(&id, now()).unwrap();
    assert_eq!(session.lock().unwrap().deck_id(), 1);
    assert_eq!(registry.len(), 1);
  }

  #[test]
  fn test_get_unknown_id() {
    let registry = SessionRegistry::new(1, 16);
    assert!(matches!(registry.get("nope", now()), Err(RegistryError::NotFound)));
  }

  #[test]
  fn test_session_expires_after_inactivity() {
    let registry = SessionRegistry::new(1, 16);
    let id = registry.insert(empty_session(), now()).unwrap();

    let later = now() + Duration::minutes(61);
    assert!(matches!(registry.get(&id, later), Err(RegistryError::NotFound)));
    assert!(registry.is_empty());
  }

  #[test]
  fn test_access_extends_lifetime() {
    let registry = SessionRegistry::new(1, 16);
    let id = registry.insert(empty_session(), now()).unwrap();

    let t1 = now() + Duration::minutes(50);
    registry.get(&id, t1).unwrap();
    let t2 = t1 + Duration::minutes(50);
    assert!(registry.get(&id, t2).is_ok());
  }

  #[test]
  fn test_full_registry_sweeps_expired_first() {
    let registry = SessionRegistry::new(2, 2);
    let stale = registry.insert(empty_session(), now()).unwrap();
    let fresh = registry.insert(empty_session(), now() + Duration::hours(2)).unwrap();

    let later = now() + Duration::hours(3);
    let newest = registry.insert(empty_session(), later).unwrap();
    assert_eq!(registry.len(), 2);
    assert!(registry.get(&stale, later).is_err());
    assert!(registry.get(&fresh, later).is_ok());
    assert!(registry.get(&newest, later).is_ok());
  }

  #[test]
  fn test_full_registry_evicts_least_recently_used() {
    let registry = SessionRegistry::new(1, 2);
    let first = registry.insert(empty_session(), now()).unwrap();
    let second = registry.insert(empty_session(), now() + Duration::minutes(1)).unwrap();
    // touching the first makes the second the least recently used
    registry.get(&first, now() + Duration::minutes(2)).unwrap();

    let t = now() + Duration::minutes(3);
    for _ in 0..5 {
      registry.insert(empty_session(), t).unwrap();
      assert!(registry.len() <= 2);
    }
    assert!(registry.get(&second, t).is_err());
    assert_eq!(registry.len(), 2);
  }

  #[test]
  fn test_remove() {
    let registry = SessionRegistry::new(1, 16);
    let id = registry.insert(empty_session(), now()).unwrap();
    assert!(registry.remove(&id).unwrap());
    assert!(!registry.remove(&id).unwrap());
    assert!(registry.get(&id, now()).is_err());
  }
}
