//! In-memory registry of live sessions.
//!
//! Each session is wrapped in its own `tokio::sync::Mutex`; holding the lock
//! is what "one in-flight mutation per session" means operationally.
//! Distinct sessions share no mutable state and run fully in parallel.

use kesher_core::session::SimulationSession;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Holds the live (not yet finalized) and recently closed sessions.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Mutex<SimulationSession>>>>,
}

impl SessionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a session, keyed by its id.
    pub async fn insert(&self, session: SimulationSession) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), Arc::new(Mutex::new(session)));
    }

    /// Gets the lock-wrapped session for an id.
    ///
    /// # Returns
    ///
    /// `Some(entry)` if the session is registered, `None` otherwise.
    pub async fn get(&self, session_id: &str) -> Option<Arc<Mutex<SimulationSession>>> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    /// Removes a session from the registry.
    pub async fn remove(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kesher_core::scenario::ScenarioCatalog;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let registry = SessionRegistry::new();
        let catalog = ScenarioCatalog::builtin();
        let session = SimulationSession::start(catalog.get("first-date-coffee").unwrap());
        let id = session.id.clone();

        registry.insert(session).await;
        assert!(registry.get(&id).await.is_some());

        registry.remove(&id).await;
        assert!(registry.get(&id).await.is_none());
    }
}
