use super::ids::{ConnectionId, InstrumentId, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cash every player starts with unless configured otherwise.
pub const DEFAULT_STARTING_BALANCE: f64 = 500.0;

/// Quantities held per instrument. Absent entries count as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Holdings {
    positions: BTreeMap<InstrumentId, u64>,
}

impl Holdings {
    pub fn get_quantity(&self, instrument: InstrumentId) -> u64 {
        self.positions.get(&instrument).copied().unwrap_or(0)
    }

    pub fn add(&mut self, instrument: InstrumentId, quantity: u64) {
        *self.positions.entry(instrument).or_insert(0) += quantity;
    }

    /// Removes `quantity` from the position. Returns `false` and leaves the
    /// position untouched if fewer units are held.
    pub fn remove(&mut self, instrument: InstrumentId, quantity: u64) -> bool {
        match self.positions.get_mut(&instrument) {
            Some(held) if *held >= quantity => {
                *held -= quantity;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, InstrumentId, u64> {
        self.positions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.values().all(|qty| *qty == 0)
    }
}

/// A joined participant.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    username: String,
    balance: f64,
    holdings: Holdings,
    connection: ConnectionId,
}

impl Player {
    pub fn new(
        id: PlayerId,
        username: impl Into<String>,
        balance: f64,
        connection: ConnectionId,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            balance,
            holdings: Holdings::default(),
            connection,
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn holdings(&self) -> &Holdings {
        &self.holdings
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    /// Debits `cost` and credits the position. Refused when the balance
    /// cannot cover the cost.
    pub(crate) fn buy(&mut self, instrument: InstrumentId, quantity: u64, cost: f64) -> bool {
        if self.balance < cost {
            return false;
        }
        self.balance -= cost;
        self.holdings.add(instrument, quantity);
        true
    }

    /// Releases `quantity` units for `proceeds`. Refused when fewer units are held.
    pub(crate) fn sell(&mut self, instrument: InstrumentId, quantity: u64, proceeds: f64) -> bool {
        if !self.holdings.remove(instrument, quantity) {
            return false;
        }
        self.balance += proceeds;
        true
    }
}
