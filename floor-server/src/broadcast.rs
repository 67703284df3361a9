//! # Broadcast Channel
//!
//! Fan-out of server messages to every open connection, plus unicast for
//! player-private frames.
//!
//! Each connection is represented by the sending half of an unbounded channel.
//! A writer task owned by the socket drains the other half. Once that task is
//! gone the channel reports closed and the connection is skipped: nothing is
//! queued for it and nothing fails for the others.

use floor_core::models::ConnectionId;
use floor_core::ServerMessage;
use log::{debug, error};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Outbound queue of one connection. Frames are pre-encoded JSON text.
pub type Outbound = mpsc::UnboundedSender<String>;

#[derive(Debug, Default)]
pub struct Broadcaster {
    connections: HashMap<ConnectionId, Outbound>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    pub fn attach(&mut self, connection: ConnectionId, outbound: Outbound) {
        self.connections.insert(connection, outbound);
    }

    /// Forgets a connection. Returns `false` if it was not attached.
    pub fn detach(&mut self, connection: &ConnectionId) -> bool {
        self.connections.remove(connection).is_some()
    }

    pub fn is_open(&self, connection: &ConnectionId) -> bool {
        self.connections
            .get(connection)
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }

    /// Delivers `message` to every open connection and returns how many
    /// accepted it.
    pub fn broadcast_all(&self, message: &ServerMessage) -> usize {
        let text = match message.encode() {
            Ok(text) => text,
            Err(e) => {
                error!("Broadcast dropped: {}", e);
                return 0;
            }
        };

        let mut delivered = 0;
        for (connection, tx) in &self.connections {
            if Self::deliver(connection, tx, text.clone()) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Delivers `message` to a single connection if it is still open.
    pub fn send_one(&self, connection: &ConnectionId, message: &ServerMessage) -> bool {
        let Some(tx) = self.connections.get(connection) else {
            debug!("Unicast to unknown connection {} skipped", connection);
            return false;
        };

        match message.encode() {
            Ok(text) => Self::deliver(connection, tx, text),
            Err(e) => {
                error!("Unicast to {} dropped: {}", connection, e);
                false
            }
        }
    }

    fn deliver(connection: &ConnectionId, tx: &Outbound, text: String) -> bool {
        if tx.is_closed() {
            debug!("Connection {} is closed, skipping", connection);
            return false;
        }
        if tx.send(text).is_err() {
            debug!("Connection {} went away mid-send, skipping", connection);
            return false;
        }
        true
    }
}
