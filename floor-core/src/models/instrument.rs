use super::ids::InstrumentId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Prices are never allowed to fall below this value.
pub const PRICE_FLOOR: f64 = 0.1;

/// Default number of prices kept in an instrument's rolling history.
pub const DEFAULT_HISTORY_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Safe,
    Moderate,
    Volatile,
}

/// A simulated security.
///
/// Serializes to the wire shape `{id, name, type, price, volatility, history}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    id: InstrumentId,
    name: String,
    #[serde(rename = "type")]
    category: RiskCategory,
    price: f64,
    volatility: f64,
    history: VecDeque<f64>,
}

impl Instrument {
    /// Creates an instrument whose history is seeded with its starting price.
    pub fn new(
        id: InstrumentId,
        name: impl Into<String>,
        category: RiskCategory,
        price: f64,
        volatility: f64,
    ) -> Self {
        let price = price.max(PRICE_FLOOR);
        Self {
            id,
            name: name.into(),
            category,
            price,
            volatility,
            history: VecDeque::from(vec![price]),
        }
    }

    pub fn id(&self) -> InstrumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> RiskCategory {
        self.category
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn history(&self) -> &VecDeque<f64> {
        &self.history
    }

    /// Largest move allowed in one tick, in either direction.
    pub fn max_move(&self) -> f64 {
        self.volatility * self.price * 0.1
    }

    /// Moves the price by `delta`, clamped at [`PRICE_FLOOR`], and records it.
    ///
    /// The oldest history entries are evicted once more than `history_len`
    /// prices are held.
    pub fn apply_move(&mut self, delta: f64, history_len: usize) -> f64 {
        self.price = (self.price + delta).max(PRICE_FLOOR);
        self.history.push_back(self.price);
        while self.history.len() > history_len.max(1) {
            self.history.pop_front();
        }
        self.price
    }
}

/// The fixed set of instruments every session starts with.
pub fn default_catalog() -> Vec<Instrument> {
    use RiskCategory::*;
    [
        (1, "SafeGov Bond", Safe, 100.0, 0.08),
        (2, "StableBlue Chip", Safe, 150.0, 0.12),
        (3, "GrowthTech Inc", Moderate, 200.0, 0.25),
        (4, "ValueRetail Co", Moderate, 80.0, 0.30),
        (5, "BioFuture Labs", Volatile, 50.0, 0.50),
        (6, "CryptoMoon X", Volatile, 10.0, 0.90),
        (7, "WildWest Energy", Volatile, 30.0, 0.70),
        (8, "AIVision Corp", Volatile, 120.0, 0.60),
    ]
    .into_iter()
    .map(|(id, name, category, price, volatility)| {
        Instrument::new(InstrumentId::new(id), name, category, price, volatility)
    })
    .collect()
}
