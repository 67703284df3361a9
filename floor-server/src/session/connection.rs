use floor_core::models::{ConnectionId, PlayerId};
use std::collections::HashMap;

/// Where a live connection is in its lifecycle.
///
/// `Closed` has no variant: a closed connection is removed from the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Accepted, no join processed yet.
    Connecting,
    /// Bound to a registered player.
    Joined(PlayerId),
}

/// Explicit connection -> state mapping, consulted on every inbound frame.
#[derive(Debug, Default)]
pub struct ConnectionTable {
    states: HashMap<ConnectionId, ConnectionState>,
}

impl ConnectionTable {
    pub fn open(&mut self, connection: ConnectionId) {
        self.states.insert(connection, ConnectionState::Connecting);
    }

    /// Binds the connection to a player. Returns the player it was bound to
    /// before, if any.
    pub fn bind(&mut self, connection: ConnectionId, player: PlayerId) -> Option<PlayerId> {
        match self.states.insert(connection, ConnectionState::Joined(player)) {
            Some(ConnectionState::Joined(previous)) => Some(previous),
            _ => None,
        }
    }

    /// Drops the connection and returns its last state.
    pub fn close(&mut self, connection: &ConnectionId) -> Option<ConnectionState> {
        self.states.remove(connection)
    }

    pub fn state(&self, connection: &ConnectionId) -> Option<&ConnectionState> {
        self.states.get(connection)
    }

    pub fn player(&self, connection: &ConnectionId) -> Option<&PlayerId> {
        match self.states.get(connection) {
            Some(ConnectionState::Joined(player)) => Some(player),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
