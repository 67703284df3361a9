//! # Wire Protocol
//!
//! JSON text frames exchanged over the WebSocket. Both directions carry a
//! `type` field that selects the variant; unknown types fail to decode.

use crate::error::{FloorError, Result};
use crate::models::{Holdings, Instrument, InstrumentId, PlayerId, Side};
use crate::valuation::LeaderboardEntry;
use serde::{Deserialize, Serialize};

/// Client -> server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        username: String,
    },
    Trade {
        #[serde(rename = "stockId")]
        stock_id: InstrumentId,
        action: Side,
        /// Any JSON number; the trade engine decides whether it is a usable
        /// quantity.
        quantity: serde_json::Number,
    },
}

impl ClientMessage {
    pub fn decode(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(FloorError::MalformedMessage)
    }
}

/// Server -> client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once to a connection right after it joins.
    Init {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        stocks: Vec<Instrument>,
    },
    Leaderboard {
        leaderboard: Vec<LeaderboardEntry>,
    },
    /// Private cash and holdings of the receiving player.
    UpdatePlayer {
        balance: f64,
        portfolio: Holdings,
    },
    Prices {
        stocks: Vec<Instrument>,
    },
    Error {
        message: String,
    },
}

impl ServerMessage {
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self).map_err(FloorError::Encode)
    }
}
