//! Net worth and leaderboard ranking.

use crate::market::Market;
use crate::models::Player;
use crate::registry::PlayerRegistry;
use serde::{Deserialize, Serialize};

/// One leaderboard row. `balance` carries the player's net worth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub balance: f64,
}

/// Cash plus every holding valued at its current price.
///
/// Holdings of an instrument the market does not know contribute nothing.
pub fn net_worth(player: &Player, market: &Market) -> f64 {
    let positions: f64 = player
        .holdings()
        .iter()
        .filter_map(|(id, qty)| market.price_of(*id).map(|price| price * *qty as f64))
        .sum();
    player.balance() + positions
}

/// All joined players ranked by net worth, richest first.
///
/// Equal net worths keep join order.
pub fn leaderboard(registry: &PlayerRegistry, market: &Market) -> Vec<LeaderboardEntry> {
    let mut rows: Vec<LeaderboardEntry> = registry
        .all()
        .map(|player| LeaderboardEntry {
            username: player.username().to_string(),
            balance: net_worth(player, market),
        })
        .collect();

    // sort_by is stable: ties keep join order.
    rows.sort_by(|a, b| b.balance.total_cmp(&a.balance));
    rows
}
