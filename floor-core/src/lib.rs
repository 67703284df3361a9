//! Session state for the trading floor: the market, the joined players, the
//! trade rules, the leaderboard and the JSON messages that carry them.
//!
//! Nothing in this crate performs I/O or owns a clock. The server drives ticks
//! and hands every mutation to these types one at a time.

pub mod engine;
pub mod error;
pub mod market;
pub mod models;
pub mod protocol;
pub mod registry;
pub mod valuation;

pub use engine::{Fill, RejectReason, TradeEngine, TradeOutcome};
pub use error::{FloorError, Result};
pub use market::Market;
pub use protocol::{ClientMessage, ServerMessage};
pub use registry::PlayerRegistry;
pub use valuation::{leaderboard, net_worth, LeaderboardEntry};
