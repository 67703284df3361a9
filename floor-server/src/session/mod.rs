//! # Session
//!
//! The single owner of the shared trading floor: the market, the player
//! registry, the connection table and the broadcaster.
//!
//! ## Execution model
//! Socket tasks never touch session state. They send [`SessionCommand`]s to
//! one actor task, which handles them one by one together with the price
//! ticks of its own timer. A command or a tick always runs to completion
//! before the next one starts, so no mutation ever interleaves with another
//! and no lock guards the market or the registry.

pub mod connection;

use crate::broadcast::{Broadcaster, Outbound};
use crate::config::ServerConfig;
use connection::{ConnectionState, ConnectionTable};
use floor_core::models::{default_catalog, ConnectionId, Instrument, PlayerId, TradeRequest};
use floor_core::{
    leaderboard, ClientMessage, LeaderboardEntry, Market, PlayerRegistry, ServerMessage,
    TradeEngine,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Everything the actor can be asked to do.
#[derive(Debug)]
pub enum SessionCommand {
    /// A socket was accepted. `outbound` feeds its writer task.
    Connect {
        connection: ConnectionId,
        outbound: Outbound,
    },
    /// A text frame arrived on a socket.
    Inbound {
        connection: ConnectionId,
        payload: String,
    },
    /// The socket closed, cleanly or not.
    Disconnect { connection: ConnectionId },
    /// Read-only view for the HTTP API.
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Point-in-time copy of the public session state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub stocks: Vec<Instrument>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub players: usize,
    pub connections: usize,
}

/// Cloneable sender side of the actor.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn connect(&self, connection: ConnectionId, outbound: Outbound) -> anyhow::Result<()> {
        self.send(SessionCommand::Connect {
            connection,
            outbound,
        })
    }

    pub fn inbound(&self, connection: ConnectionId, payload: String) -> anyhow::Result<()> {
        self.send(SessionCommand::Inbound {
            connection,
            payload,
        })
    }

    pub fn disconnect(&self, connection: ConnectionId) -> anyhow::Result<()> {
        self.send(SessionCommand::Disconnect { connection })
    }

    pub async fn snapshot(&self) -> anyhow::Result<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot { reply })?;
        Ok(rx.await?)
    }

    fn send(&self, command: SessionCommand) -> anyhow::Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow::anyhow!("Session actor has stopped"))
    }
}

pub struct Session {
    market: Market,
    registry: PlayerRegistry,
    connections: ConnectionTable,
    broadcaster: Broadcaster,
    rng: StdRng,
}

impl Session {
    pub fn new(market: Market, registry: PlayerRegistry, rng: StdRng) -> Self {
        Self {
            market,
            registry,
            connections: ConnectionTable::default(),
            broadcaster: Broadcaster::new(),
            rng,
        }
    }

    /// Default catalog with the configured balance and history length.
    pub fn from_config(config: &ServerConfig) -> Self {
        let market = Market::new(default_catalog(), config.history_len);
        let registry = PlayerRegistry::new(config.starting_balance);
        Self::new(market, registry, StdRng::from_entropy())
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn connection_state(&self, connection: &ConnectionId) -> Option<&ConnectionState> {
        self.connections.state(connection)
    }

    /// Starts the actor on the current runtime.
    pub fn spawn(self, tick_interval: Duration) -> (SessionHandle, JoinHandle<()>) {
        let (commands, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(rx, tick_interval));
        (SessionHandle { commands }, task)
    }

    /// Processes commands and ticks until every handle is dropped.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
        tick_interval: Duration,
    ) {
        info!(
            "Session started: {} instruments, tick every {:?}",
            self.market.instruments().len(),
            tick_interval
        );

        // First tick one full interval after start.
        let mut ticker = time::interval_at(Instant::now() + tick_interval, tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = ticker.tick() => self.tick(),
            }
        }

        info!("Session stopped: all handles dropped");
    }

    pub fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Connect {
                connection,
                outbound,
            } => self.on_connect(connection, outbound),
            SessionCommand::Inbound {
                connection,
                payload,
            } => self.on_message(connection, &payload),
            SessionCommand::Disconnect { connection } => self.on_disconnect(connection),
            SessionCommand::Snapshot { reply } => {
                // The requester may have given up; nothing to do then.
                let _ = reply.send(self.snapshot());
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            stocks: self.market.snapshot(),
            leaderboard: leaderboard(&self.registry, &self.market),
            players: self.registry.len(),
            connections: self.connections.len(),
        }
    }

    /// One price-evolution cycle followed by the price and leaderboard fan-out.
    pub fn tick(&mut self) {
        self.market.evolve_prices(&mut self.rng);
        self.broadcaster.broadcast_all(&ServerMessage::Prices {
            stocks: self.market.snapshot(),
        });
        self.broadcast_leaderboard();
    }

    fn on_connect(&mut self, connection: ConnectionId, outbound: Outbound) {
        info!("Connection {} opened", connection);
        self.connections.open(connection);
        self.broadcaster.attach(connection, outbound);
    }

    fn on_message(&mut self, connection: ConnectionId, payload: &str) {
        if self.connections.state(&connection).is_none() {
            debug!("Frame from closed connection {} ignored", connection);
            return;
        }

        match ClientMessage::decode(payload) {
            Ok(ClientMessage::Join { username }) => self.on_join(connection, username),
            Ok(ClientMessage::Trade {
                stock_id,
                action,
                quantity,
            }) => {
                let request = TradeRequest::from_raw(stock_id, action, &quantity);
                self.on_trade(connection, &request);
            }
            Err(e) => {
                warn!("Connection {}: {}", connection, e);
                self.broadcaster.send_one(
                    &connection,
                    &ServerMessage::Error {
                        message: e.to_string(),
                    },
                );
            }
        }
    }

    fn on_join(&mut self, connection: ConnectionId, username: String) {
        let player_id = self.registry.join(connection, username, &mut self.rng);

        // A connection holds at most one player; joining again replaces it.
        if let Some(previous) = self.connections.bind(connection, player_id.clone()) {
            info!("Connection {} re-joined, dropping player {}", connection, previous);
            self.registry.remove(&previous);
        }

        if let Some(player) = self.registry.get(&player_id) {
            info!(
                "Player {} ({}) joined on {}",
                player_id,
                player.username(),
                connection
            );
        }

        self.broadcaster.send_one(
            &connection,
            &ServerMessage::Init {
                player_id,
                stocks: self.market.snapshot(),
            },
        );
        self.broadcast_leaderboard();
    }

    fn on_trade(&mut self, connection: ConnectionId, request: &TradeRequest) {
        let Some(player_id) = self.connections.player(&connection).cloned() else {
            debug!("Trade from {} before join ignored", connection);
            return;
        };

        // Rejections stay silent on the wire; the state echo below tells the
        // client its request was processed.
        TradeEngine::execute(&self.market, &mut self.registry, &player_id, request);

        self.broadcast_leaderboard();
        self.send_player_update(connection, &player_id);
    }

    fn on_disconnect(&mut self, connection: ConnectionId) {
        self.broadcaster.detach(&connection);

        match self.connections.close(&connection) {
            Some(ConnectionState::Joined(player_id)) => {
                self.registry.remove(&player_id);
                info!("Connection {} closed, player {} left", connection, player_id);
                self.broadcast_leaderboard();
            }
            Some(ConnectionState::Connecting) => {
                info!("Connection {} closed before joining", connection);
            }
            None => debug!("Duplicate close for {}", connection),
        }
    }

    fn send_player_update(&self, connection: ConnectionId, player_id: &PlayerId) {
        let Some(player) = self.registry.get(player_id) else {
            return;
        };
        self.broadcaster.send_one(
            &connection,
            &ServerMessage::UpdatePlayer {
                balance: player.balance(),
                portfolio: player.holdings().clone(),
            },
        );
    }

    fn broadcast_leaderboard(&self) {
        self.broadcaster.broadcast_all(&ServerMessage::Leaderboard {
            leaderboard: leaderboard(&self.registry, &self.market),
        });
    }
}

#[cfg(test)]
mod tests;
