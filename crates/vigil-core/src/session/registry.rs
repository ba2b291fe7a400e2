use super::{Session, SessionSettings};
use crate::aggregator::SessionStats;
use crate::policy::Decision;
use crate::signal::{Observation, PerceptionSignal};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(Uuid),
    #[error("session {0} has already ended")]
    Ended(Uuid),
    #[error("session lock poisoned")]
    Poisoned,
}

type SharedSession = Arc<Mutex<Session>>;

/// Live sessions keyed by id
///
/// Each session sits behind its own mutex, so ticks for one session are
/// serialized while different sessions run in parallel. The map lock is
/// only held long enough to look a session up.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session and return its id
    ///
    /// # Errors
    ///
    /// Returns an error if the registry lock is poisoned
    pub fn create(
        &self,
        settings: SessionSettings,
        started_at: DateTime<Utc>,
    ) -> Result<Uuid, SessionError> {
        let id = Uuid::new_v4();
        let session = Session::with_settings(id, settings, started_at);
        self.sessions
            .write()
            .map_err(|_| SessionError::Poisoned)?
            .insert(id, Arc::new(Mutex::new(session)));
        Ok(id)
    }

    fn get(&self, id: Uuid) -> Result<SharedSession, SessionError> {
        self.sessions
            .read()
            .map_err(|_| SessionError::Poisoned)?
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound(id))
    }

    fn with_active<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, SessionError> {
        let shared = self.get(id)?;
        let mut session = shared.lock().map_err(|_| SessionError::Poisoned)?;
        if !session.is_active() {
            return Err(SessionError::Ended(id));
        }
        Ok(f(&mut session))
    }

    /// Feed one observation to a session
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or has ended
    pub fn tick(
        &self,
        id: Uuid,
        observation: &Observation,
        now: DateTime<Utc>,
    ) -> Result<Decision, SessionError> {
        self.with_active(id, |session| session.tick(observation, now))
    }

    /// Feed a pre-assembled signal to a session
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or has ended
    pub fn process(
        &self,
        id: Uuid,
        signal: &PerceptionSignal,
        now: DateTime<Utc>,
    ) -> Result<Decision, SessionError> {
        self.with_active(id, |session| session.process(signal, now))
    }

    /// Current statistics; works on ended sessions too
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown
    pub fn stats(&self, id: Uuid) -> Result<SessionStats, SessionError> {
        let shared = self.get(id)?;
        let session = shared.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(session.stats())
    }

    /// Mark a session inactive and return its final statistics
    ///
    /// The session stays readable until [`remove`](Self::remove) is called.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or already ended
    pub fn end(&self, id: Uuid, now: DateTime<Utc>) -> Result<SessionStats, SessionError> {
        self.with_active(id, |session| session.end(now))
    }

    /// Drop a session, returning it for archiving
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown
    pub fn remove(&self, id: Uuid) -> Result<Session, SessionError> {
        let shared = self
            .sessions
            .write()
            .map_err(|_| SessionError::Poisoned)?
            .remove(&id)
            .ok_or(SessionError::NotFound(id))?;
        let session = shared.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(session.clone())
    }

    /// Ids of sessions still accepting ticks
    ///
    /// # Errors
    ///
    /// Returns an error if a lock is poisoned
    pub fn active_ids(&self) -> Result<Vec<Uuid>, SessionError> {
        let sessions = self.sessions.read().map_err(|_| SessionError::Poisoned)?;
        let mut ids = Vec::new();
        for (id, shared) in sessions.iter() {
            if shared.lock().map_err(|_| SessionError::Poisoned)?.is_active() {
                ids.push(*id);
            }
        }
        Ok(ids)
    }

    /// Number of sessions held, active or ended
    ///
    /// # Errors
    ///
    /// Returns an error if the registry lock is poisoned
    pub fn count(&self) -> Result<usize, SessionError> {
        Ok(self
            .sessions
            .read()
            .map_err(|_| SessionError::Poisoned)?
            .len())
    }
}
