//! Realtime multiplayer trading floor server.
//!
//! Clients connect over a WebSocket, join the shared session, trade against a
//! server-driven price feed and watch a live leaderboard.

pub mod api;
pub mod args;
pub mod broadcast;
pub mod config;
pub mod session;

pub use config::ServerConfig;
pub use session::{Session, SessionCommand, SessionHandle, SessionSnapshot};
