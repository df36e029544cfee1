use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::HandshakeError;
use crate::session::Session;
use crate::types::SessionId;

/// Who is online: display name to session.
///
/// The registry is the only authority on presence. Every operation is atomic
/// on its own; fan-out iterates a cloned snapshot so no shard lock is held
/// while lines are being queued.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    sessions: DashMap<String, Arc<Session>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the session under its name unless that name is already held.
    pub fn register(&self, session: Arc<Session>) -> Result<(), HandshakeError> {
        match self.sessions.entry(session.name.clone()) {
            Entry::Occupied(_) => Err(HandshakeError::NameTaken(session.name.clone())),
            Entry::Vacant(slot) => {
                slot.insert(session);
                Ok(())
            }
        }
    }

    /// Remove `name` if it still belongs to session `id`.
    pub fn unregister(&self, name: &str, id: SessionId) -> bool {
        self.sessions
            .remove_if(name, |_, session| session.id == id)
            .is_some()
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Session>> {
        self.sessions.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sessions.contains_key(name)
    }

    /// Point-in-time copy of everyone online.
    pub fn snapshot(&self) -> Vec<Arc<Session>> {
        self.sessions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Sorted list of online names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: u64, name: &str) -> Arc<Session> {
        Session::new(SessionId::new(id), name, 4).0
    }

    #[test]
    fn register_rejects_taken_names() {
        let registry = ClientRegistry::new();
        registry.register(session(1, "alice")).unwrap();

        assert_eq!(
            registry.register(session(2, "alice")),
            Err(HandshakeError::NameTaken("alice".into()))
        );
        assert_eq!(registry.lookup("alice").unwrap().id, SessionId::new(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_checks_ownership() {
        let registry = ClientRegistry::new();
        registry.register(session(1, "alice")).unwrap();

        assert!(!registry.unregister("alice", SessionId::new(2)));
        assert!(registry.contains("alice"));
        assert!(registry.unregister("alice", SessionId::new(1)));
        assert!(!registry.unregister("alice", SessionId::new(1)));
        assert!(registry.is_empty());
    }

    #[test]
    fn name_is_reusable_after_leaving() {
        let registry = ClientRegistry::new();
        registry.register(session(1, "alice")).unwrap();
        registry.unregister("alice", SessionId::new(1));
        registry.register(session(2, "alice")).unwrap();
        assert_eq!(registry.lookup("alice").unwrap().id, SessionId::new(2));
    }

    #[test]
    fn snapshot_is_stable_under_removal() {
        let registry = ClientRegistry::new();
        registry.register(session(1, "alice")).unwrap();
        registry.register(session(2, "bob")).unwrap();

        let snapshot = registry.snapshot();
        registry.unregister("bob", SessionId::new(2));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.names(), vec!["alice"]);
    }

    #[test]
    fn concurrent_claims_admit_one_owner() {
        let registry = Arc::new(ClientRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.register(session(i, "dup")).is_ok())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert_eq!(registry.len(), 1);
    }
}
