//! In-memory table of joined players.
//!
//! Pure data, no I/O. The session owns the only instance and is the only writer.

use crate::models::{ConnectionId, Player, PlayerId, DEFAULT_STARTING_BALANCE};
use rand::Rng;
use std::collections::HashMap;

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 9;

#[derive(Debug, Clone)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, Player>,
    /// Join order, used to iterate deterministically.
    order: Vec<PlayerId>,
    starting_balance: f64,
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_BALANCE)
    }
}

impl PlayerRegistry {
    pub fn new(starting_balance: f64) -> Self {
        Self {
            players: HashMap::new(),
            order: Vec::new(),
            starting_balance,
        }
    }

    /// Registers a new player bound to `connection` and returns its fresh id.
    ///
    /// Tokens are random; a token already in use is drawn again.
    pub fn join<R: Rng + ?Sized>(
        &mut self,
        connection: ConnectionId,
        username: impl Into<String>,
        rng: &mut R,
    ) -> PlayerId {
        let id = loop {
            let candidate = PlayerId::new(random_token(rng));
            if !self.players.contains_key(&candidate) {
                break candidate;
            }
        };

        let player = Player::new(id.clone(), username, self.starting_balance, connection);
        self.players.insert(id.clone(), player);
        self.order.push(id.clone());
        id
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn get_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    /// Removes a player. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: &PlayerId) -> Option<Player> {
        let removed = self.players.remove(id)?;
        self.order.retain(|other| other != id);
        Some(removed)
    }

    /// Iterates players in join order.
    pub fn all(&self) -> impl Iterator<Item = &Player> {
        self.order.iter().filter_map(|id| self.players.get(id))
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

fn random_token<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}
