//! HTTP surface of the server.
//!
//! `/ws` hands every accepted socket to the session actor. The page-rendering
//! routes of the game client are served elsewhere.

use crate::session::SessionHandle;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use floor_core::models::ConnectionId;
use futures::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub session: SessionHandle,
}

pub fn router(session: SessionHandle) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/state", get(state_handler))
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(AppState { session })
}

pub async fn run_api_server(session: SessionHandle, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API Server listening on {}", addr);

    axum::serve(listener, router(session)).await?;
    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn state_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.session.snapshot().await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => {
            error!("Snapshot failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state.session))
}

/// Pumps one socket until either direction ends, then reports the close.
async fn handle_socket(socket: WebSocket, session: SessionHandle) {
    let connection = ConnectionId::new();
    let (mut sender, mut receiver) = socket.split();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();

    if let Err(e) = session.connect(connection, outbound) {
        error!("Rejecting socket {}: {}", connection, e);
        return;
    }

    // Writer: session frames -> socket.
    let mut send_task = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if sender.send(Message::Text(text)).await.is_err() {
                break; // Client disconnected
            }
        }
    });

    // Reader: socket frames -> session.
    let inbound = session.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if inbound.inbound(connection, text).is_err() {
                        break; // Session stopped
                    }
                }
                Ok(Message::Binary(_)) => {
                    debug!("Binary frame from {} ignored", connection);
                }
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    warn!("WebSocket error on {}: {}", connection, e);
                    break;
                }
                _ => {} // Ping/pong handled by axum
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    if let Err(e) = session.disconnect(connection) {
        debug!("Close of {} not delivered: {}", connection, e);
    }
}
