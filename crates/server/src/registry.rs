//! Session registry
//!
//! One slot per role. Replacing a slot hands back the previous connection so
//! the caller can close it.

use parking_lot::RwLock;
use serde::Serialize;

use signbridge_core::ParticipantRole;

use crate::connection::{Connection, ConnectionHandle, ConnectionId};

/// Which roles currently have a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionSnapshot {
    pub signer: bool,
    pub hearing: bool,
}

pub struct SessionRegistry {
    slots: RwLock<[Option<ConnectionHandle>; 2]>,
}

fn slot(role: ParticipantRole) -> usize {
    match role {
        ParticipantRole::Signer => 0,
        ParticipantRole::Hearing => 1,
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new([None, None]),
        }
    }

    /// Install `connection` for `role`, returning whatever it replaced
    pub fn set(
        &self,
        role: ParticipantRole,
        connection: ConnectionHandle,
    ) -> Option<ConnectionHandle> {
        self.slots.write()[slot(role)].replace(connection)
    }

    pub fn get(&self, role: ParticipantRole) -> Option<ConnectionHandle> {
        self.slots.read()[slot(role)].clone()
    }

    /// Clear the slot only if it still holds connection `id`
    pub fn clear_if_current(&self, role: ParticipantRole, id: ConnectionId) -> bool {
        let mut slots = self.slots.write();
        let index = slot(role);
        let is_current = slots[index]
            .as_ref()
            .is_some_and(|current| current.id() == id);
        if is_current {
            slots[index] = None;
        }
        is_current
    }

    pub fn clear(&self, role: ParticipantRole) -> Option<ConnectionHandle> {
        self.slots.write()[slot(role)].take()
    }

    pub fn is_connected(&self, role: ParticipantRole) -> bool {
        self.slots.read()[slot(role)].is_some()
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        let slots = self.slots.read();
        ConnectionSnapshot {
            signer: slots[slot(ParticipantRole::Signer)].is_some(),
            hearing: slots[slot(ParticipantRole::Hearing)].is_some(),
        }
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
    use crate::testing::RecordingConnection;

    #[test]
    fn test_set_returns_previous() {
        let registry = SessionRegistry::new();
        let c1 = RecordingConnection::handle(ParticipantRole::Signer);
        let c2 = RecordingConnection::handle(ParticipantRole::Signer);

        assert!(registry.set(ParticipantRole::Signer, c1.clone()).is_none());
        let previous = registry.set(ParticipantRole::Signer, c2.clone()).unwrap();

        assert_eq!(previous.id(), c1.id());
        assert_eq!(registry.get(ParticipantRole::Signer).unwrap().id(), c2.id());
    }

    #[test]
    fn test_clear_if_current_checks_identity() {
        let registry = SessionRegistry::new();
        let a = RecordingConnection::handle(ParticipantRole::Signer);
        let b = RecordingConnection::handle(ParticipantRole::Signer);

        registry.set(ParticipantRole::Signer, a.clone());
        registry.set(ParticipantRole::Signer, b.clone());

        // A's late cleanup must not evict B
        assert!(!registry.clear_if_current(ParticipantRole::Signer, a.id()));
        assert_eq!(registry.get(ParticipantRole::Signer).unwrap().id(), b.id());

        assert!(registry.clear_if_current(ParticipantRole::Signer, b.id()));
        assert!(registry.get(ParticipantRole::Signer).is_none());
    }

    #[test]
    fn test_roles_are_independent() {
        let registry = SessionRegistry::new();
        let hearing = RecordingConnection::handle(ParticipantRole::Hearing);
        registry.set(ParticipantRole::Hearing, hearing);

        assert_eq!(
            registry.snapshot(),
            ConnectionSnapshot {
                signer: false,
                hearing: true
            }
        );
        assert!(registry.clear(ParticipantRole::Signer).is_none());
        assert!(registry.clear(ParticipantRole::Hearing).is_some());
        assert!(!registry.is_connected(ParticipantRole::Hearing));
    }
}
