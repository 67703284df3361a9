use super::ids::InstrumentId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// A request to buy or sell a whole number of units at the current price.
///
/// `quantity` is kept as received; the engine refuses anything that is not a
/// positive integer.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRequest {
    instrument: InstrumentId,
    side: Side,
    quantity: Option<u64>,
}

impl TradeRequest {
    pub fn new(instrument: InstrumentId, side: Side, quantity: u64) -> Self {
        Self {
            instrument,
            side,
            quantity: Some(quantity),
        }
    }

    /// Builds a request from a raw JSON number. Whole-valued floats such as
    /// `3.0` count as integers; negative and fractional values are kept as
    /// "no quantity".
    pub fn from_raw(instrument: InstrumentId, side: Side, quantity: &serde_json::Number) -> Self {
        let quantity = quantity.as_u64().or_else(|| {
            quantity
                .as_f64()
                .filter(|q| q.is_finite() && q.fract() == 0.0 && *q >= 0.0 && *q <= u64::MAX as f64)
                .map(|q| q as u64)
        });
        Self {
            instrument,
            side,
            quantity,
        }
    }

    pub fn instrument(&self) -> InstrumentId {
        self.instrument
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// The requested quantity, if it is a positive integer.
    pub fn quantity(&self) -> Option<u64> {
        self.quantity.filter(|qty| *qty > 0)
    }
}
