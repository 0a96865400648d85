//! Registry of live game sessions.

use crate::sync::lock;
use crate::{GameSession, SessionError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use strictly_ladders::{BoardDimension, GameError};
use tracing::{debug, info, instrument, warn};

/// Opaque identifier of a session, unique for the life of the process.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    /// Numeric value of the id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl FromStr for SessionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    last_id: u64,
    sessions: BTreeMap<SessionId, Arc<GameSession>>,
}

/// Creates, stores, and looks up sessions by id.
///
/// Ids are issued from a counter that only moves forward, so an id is never
/// handed out twice even if sessions are later removed.
#[derive(Debug)]
pub struct SessionRegistry {
    max_grid_size: usize,
    queue_capacity: NonZeroUsize,
    inner: Mutex<RegistryInner>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    ///
    /// Boards larger than `max_grid_size` are refused.
    #[instrument]
    pub fn new(max_grid_size: usize, queue_capacity: NonZeroUsize) -> Self {
        Self {
            max_grid_size,
            queue_capacity,
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// Largest accepted grid size.
    pub fn max_grid_size(&self) -> usize {
        self.max_grid_size
    }

    /// Creates a session with a freshly generated board.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfiguration`] for a grid size below 2
    /// or above the configured maximum.
    pub fn create(&self, grid_size: usize) -> Result<Arc<GameSession>, GameError> {
        self.create_with(grid_size, &mut rand::rng())
    }

    /// Creates a session, drawing the board layout from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfiguration`] for a grid size below 2
    /// or above the configured maximum.
    #[instrument(skip(self, rng))]
    pub fn create_with<R: Rng + ?Sized>(
        &self,
        grid_size: usize,
        rng: &mut R,
    ) -> Result<Arc<GameSession>, GameError> {
        if grid_size > self.max_grid_size {
            warn!(max = self.max_grid_size, "Grid size above limit");
            return Err(GameError::InvalidConfiguration(format!(
                "grid size {grid_size} exceeds maximum {}",
                self.max_grid_size
            )));
        }
        let dimension = BoardDimension::new(grid_size)?;

        let mut inner = lock(&self.inner, "registry");
        inner.last_id += 1;
        let id = SessionId(inner.last_id);
        let session = Arc::new(GameSession::generate(
            id,
            dimension,
            self.queue_capacity,
            rng,
        ));
        inner.sessions.insert(id, Arc::clone(&session));
        info!(%id, live = inner.sessions.len(), "Session created");
        Ok(session)
    }

    /// Looks up a session.
    #[instrument(skip(self))]
    pub fn get(&self, id: SessionId) -> Option<Arc<GameSession>> {
        let session = lock(&self.inner, "registry").sessions.get(&id).cloned();
        if session.is_none() {
            debug!("Session not found");
        }
        session
    }

    /// Looks up a session, failing with [`SessionError::NotFound`].
    pub fn require(&self, id: SessionId) -> Result<Arc<GameSession>, SessionError> {
        self.get(id).ok_or(SessionError::NotFound(id))
    }

    /// Every live session, in id order.
    pub fn sessions(&self) -> Vec<Arc<GameSession>> {
        lock(&self.inner, "registry")
            .sessions
            .values()
            .cloned()
            .collect()
    }

    /// Ids of live sessions, ascending.
    pub fn ids(&self) -> Vec<SessionId> {
        lock(&self.inner, "registry")
            .sessions
            .keys()
            .copied()
            .collect()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        lock(&self.inner, "registry").sessions.len()
    }

    /// Whether no session exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(100, NonZeroUsize::new(8).unwrap())
    }

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let registry = registry();
        let a = registry.create(10).unwrap();
        let b = registry.create(5).unwrap();
        assert_eq!(a.id().get(), 1);
        assert_eq!(b.id().get(), 2);
        assert_eq!(registry.ids(), vec![a.id(), b.id()]);
    }

    #[test]
    fn test_rejected_sizes_do_not_register() {
        let registry = registry();
        assert!(registry.create(1).is_err());
        assert!(registry.create(0).is_err());
        assert_eq!(registry.max_grid_size(), 100);
        assert!(registry.create(registry.max_grid_size() + 1).is_err());
        assert!(registry.is_empty());
        assert_eq!(registry.create(2).unwrap().board().dimension().get(), 2);
        let largest = registry.create(registry.max_grid_size()).unwrap();
        assert_eq!(largest.board().dimension().get(), 100);
    }

    #[test]
    fn test_lookup_shares_session() {
        let registry = registry();
        let created = registry.create(10).unwrap();
        let found = registry.get(created.id()).unwrap();
        assert!(Arc::ptr_eq(&created, &found));
        assert!(registry.get(SessionId::from(99)).is_none());
        assert!(matches!(
            registry.require(SessionId::from(99)),
            Err(SessionError::NotFound(id)) if id.get() == 99
        ));
    }

    #[test]
    fn test_session_id_parses() {
        assert_eq!("7".parse::<SessionId>().unwrap(), SessionId::from(7));
        assert!("abc".parse::<SessionId>().is_err());
        assert!("-1".parse::<SessionId>().is_err());
    }
}
