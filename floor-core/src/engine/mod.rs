//! # Trade Engine
//!
//! Applies a single buy or sell request against one player and one instrument.
//! Every request either fills completely or changes nothing.

use crate::market::Market;
use crate::models::{InstrumentId, PlayerId, Side, TradeRequest};
use crate::registry::PlayerRegistry;
use log::{debug, info};
use thiserror::Error;

/// Why a request was refused. Nothing is mutated when a request is refused.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectReason {
    #[error("player {0} is not registered")]
    UnknownPlayer(PlayerId),

    #[error("instrument {0} does not exist")]
    UnknownInstrument(InstrumentId),

    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    #[error("insufficient funds: cost {cost:.2} exceeds balance {balance:.2}")]
    InsufficientFunds { cost: f64, balance: f64 },

    #[error("insufficient holdings: requested {requested}, held {held}")]
    InsufficientHoldings { requested: u64, held: u64 },
}

/// A completed trade.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub instrument: InstrumentId,
    pub side: Side,
    pub quantity: u64,
    pub price: f64,
    /// Cash moved: debited on buys, credited on sells.
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TradeOutcome {
    Filled(Fill),
    Rejected(RejectReason),
}

impl TradeOutcome {
    pub fn is_filled(&self) -> bool {
        matches!(self, TradeOutcome::Filled(_))
    }

    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            TradeOutcome::Rejected(reason) => Some(reason),
            TradeOutcome::Filled(_) => None,
        }
    }
}

pub struct TradeEngine;

impl TradeEngine {
    /// Executes `request` for `player_id` at the instrument's current price.
    pub fn execute(
        market: &Market,
        registry: &mut PlayerRegistry,
        player_id: &PlayerId,
        request: &TradeRequest,
    ) -> TradeOutcome {
        match Self::try_execute(market, registry, player_id, request) {
            Ok(fill) => {
                info!(
                    "Trade filled for {}: {} {} x{} @ {:.2} ({:.2})",
                    player_id, fill.side, fill.instrument, fill.quantity, fill.price, fill.amount
                );
                TradeOutcome::Filled(fill)
            }
            Err(reason) => {
                debug!("Trade rejected for {}: {}", player_id, reason);
                TradeOutcome::Rejected(reason)
            }
        }
    }

    fn try_execute(
        market: &Market,
        registry: &mut PlayerRegistry,
        player_id: &PlayerId,
        request: &TradeRequest,
    ) -> Result<Fill, RejectReason> {
        let player = registry
            .get_mut(player_id)
            .ok_or_else(|| RejectReason::UnknownPlayer(player_id.clone()))?;
        let instrument = market
            .lookup(request.instrument())
            .ok_or(RejectReason::UnknownInstrument(request.instrument()))?;
        let quantity = request.quantity().ok_or(RejectReason::InvalidQuantity)?;

        let price = instrument.price();
        let amount = price * quantity as f64;

        match request.side() {
            Side::Buy => {
                if !player.buy(instrument.id(), quantity, amount) {
                    return Err(RejectReason::InsufficientFunds {
                        cost: amount,
                        balance: player.balance(),
                    });
                }
            }
            Side::Sell => {
                if !player.sell(instrument.id(), quantity, amount) {
                    return Err(RejectReason::InsufficientHoldings {
                        requested: quantity,
                        held: player.holdings().get_quantity(instrument.id()),
                    });
                }
            }
        }

        Ok(Fill {
            instrument: instrument.id(),
            side: request.side(),
            quantity,
            price,
            amount,
        })
    }
}
