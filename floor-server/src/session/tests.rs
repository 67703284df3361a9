use super::*;
use floor_core::models::InstrumentId;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

struct TestClient {
    id: ConnectionId,
    rx: UnboundedReceiver<String>,
}

impl TestClient {
    fn connect(session: &mut Session) -> Self {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        session.handle(SessionCommand::Connect {
            connection: id,
            outbound: tx,
        });
        Self { id, rx }
    }

    fn send(&self, session: &mut Session, payload: Value) {
        session.handle(SessionCommand::Inbound {
            connection: self.id,
            payload: payload.to_string(),
        });
    }

    fn send_raw(&self, session: &mut Session, payload: &str) {
        session.handle(SessionCommand::Inbound {
            connection: self.id,
            payload: payload.to_string(),
        });
    }

    fn close(&self, session: &mut Session) {
        session.handle(SessionCommand::Disconnect {
            connection: self.id,
        });
    }

    /// Everything received since the last call, decoded.
    fn drain(&mut self) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(text) = self.rx.try_recv() {
            frames.push(serde_json::from_str(&text).unwrap());
        }
        frames
    }

    fn join(&mut self, session: &mut Session, username: &str) -> PlayerId {
        self.send(session, json!({"type": "join", "username": username}));
        let frames = self.drain();
        let init = frames
            .iter()
            .find(|f| f["type"] == "init")
            .expect("init frame");
        PlayerId::new(init["playerId"].as_str().unwrap())
    }
}

fn create_test_session() -> Session {
    Session::new(
        Market::default(),
        PlayerRegistry::default(),
        StdRng::seed_from_u64(17),
    )
}

fn types(frames: &[Value]) -> Vec<&str> {
    frames.iter().map(|f| f["type"].as_str().unwrap()).collect()
}

#[test]
fn test_join_sends_init_then_leaderboard() {
    let mut session = create_test_session();
    let mut alice = TestClient::connect(&mut session);
    let mut watcher = TestClient::connect(&mut session);

    alice.send(&mut session, json!({"type": "join", "username": "alice"}));

    let frames = alice.drain();
    assert_eq!(types(&frames), vec!["init", "leaderboard"]);
    assert_eq!(frames[0]["stocks"].as_array().unwrap().len(), 8);
    assert_eq!(
        frames[1]["leaderboard"],
        json!([{"username": "alice", "balance": 500.0}])
    );

    let player_id = PlayerId::new(frames[0]["playerId"].as_str().unwrap());

    // Only the joiner gets `init`; everyone gets the leaderboard.
    let frames = watcher.drain();
    assert_eq!(types(&frames), vec!["leaderboard"]);
    assert_eq!(
        session.connection_state(&alice.id),
        Some(&ConnectionState::Joined(player_id))
    );
    assert_eq!(
        session.connection_state(&watcher.id),
        Some(&ConnectionState::Connecting)
    );
}

#[test]
fn test_buy_then_rejected_buy_echoes_state() {
    let mut session = create_test_session();
    let mut alice = TestClient::connect(&mut session);
    let player = alice.join(&mut session, "alice");

    alice.send(
        &mut session,
        json!({"type": "trade", "stockId": 1, "action": "buy", "quantity": 3}),
    );
    let frames = alice.drain();
    assert_eq!(types(&frames), vec!["leaderboard", "update_player"]);
    assert_eq!(
        frames[1],
        json!({"type": "update_player", "balance": 200.0, "portfolio": {"1": 3}})
    );
    assert_eq!(
        frames[0]["leaderboard"],
        json!([{"username": "alice", "balance": 500.0}])
    );

    // 3 more at 100 costs 300 with 200 left: nothing changes, state still echoed.
    alice.send(
        &mut session,
        json!({"type": "trade", "stockId": 1, "action": "buy", "quantity": 3}),
    );
    let frames = alice.drain();
    assert_eq!(types(&frames), vec!["leaderboard", "update_player"]);
    assert_eq!(frames[1]["balance"], 200.0);
    assert_eq!(frames[1]["portfolio"], json!({"1": 3}));

    let stored = session.registry().get(&player).unwrap();
    assert_eq!(stored.balance(), 200.0);
    assert_eq!(stored.holdings().get_quantity(InstrumentId::new(1)), 3);
}

#[test]
fn test_sell_and_invalid_quantity() {
    let mut session = create_test_session();
    let mut alice = TestClient::connect(&mut session);
    alice.join(&mut session, "alice");

    alice.send(
        &mut session,
        json!({"type": "trade", "stockId": 4, "action": "buy", "quantity": 5}),
    );
    alice.send(
        &mut session,
        json!({"type": "trade", "stockId": 4, "action": "sell", "quantity": 2}),
    );
    alice.send(
        &mut session,
        json!({"type": "trade", "stockId": 4, "action": "sell", "quantity": 2.5}),
    );

    let updates: Vec<Value> = alice
        .drain()
        .into_iter()
        .filter(|f| f["type"] == "update_player")
        .collect();
    assert_eq!(updates.len(), 3);
    // ValueRetail Co trades at 80.
    assert_eq!(updates[0]["balance"], 100.0);
    assert_eq!(updates[1]["balance"], 260.0);
    assert_eq!(updates[1]["portfolio"], json!({"4": 3}));
    assert_eq!(updates[2], updates[1]);
}

#[test]
fn test_trade_before_join_is_ignored() {
    let mut session = create_test_session();
    let mut client = TestClient::connect(&mut session);

    client.send(
        &mut session,
        json!({"type": "trade", "stockId": 1, "action": "buy", "quantity": 1}),
    );

    assert!(client.drain().is_empty());
    assert!(session.registry().is_empty());
    assert_eq!(
        session.connection_state(&client.id),
        Some(&ConnectionState::Connecting)
    );
}

#[test]
fn test_malformed_frame_reports_error_to_sender_only() {
    let mut session = create_test_session();
    let mut bad = TestClient::connect(&mut session);
    let mut other = TestClient::connect(&mut session);

    bad.send_raw(&mut session, "{not json");
    bad.send(&mut session, json!({"type": "teleport"}));

    let frames = bad.drain();
    assert_eq!(types(&frames), vec!["error", "error"]);
    assert!(frames[0]["message"]
        .as_str()
        .unwrap()
        .starts_with("Malformed message"));
    assert!(other.drain().is_empty());

    // The connection is still usable.
    bad.join(&mut session, "bad");
    assert_eq!(session.registry().len(), 1);
}

#[test]
fn test_trade_with_missing_or_non_numeric_quantity_is_malformed() {
    let mut session = create_test_session();
    let mut alice = TestClient::connect(&mut session);
    let mut watcher = TestClient::connect(&mut session);
    let player = alice.join(&mut session, "alice");
    watcher.drain();

    alice.send(&mut session, json!({"type": "trade", "stockId": 1, "action": "buy"}));
    alice.send(
        &mut session,
        json!({"type": "trade", "stockId": 1, "action": "buy", "quantity": "3"}),
    );

    // Error to the sender only, no leaderboard and no state echo.
    assert_eq!(types(&alice.drain()), vec!["error", "error"]);
    assert!(watcher.drain().is_empty());
    assert_eq!(session.registry().get(&player).unwrap().balance(), 500.0);
}

#[test]
fn test_unknown_and_invalid_stock_ids() {
    let mut session = create_test_session();
    let mut alice = TestClient::connect(&mut session);
    alice.join(&mut session, "alice");

    // A well-formed id that names no instrument is a rejected trade.
    alice.send(
        &mut session,
        json!({"type": "trade", "stockId": 42, "action": "buy", "quantity": 1}),
    );
    let frames = alice.drain();
    assert_eq!(types(&frames), vec!["leaderboard", "update_player"]);
    assert_eq!(frames[1]["balance"], 500.0);

    // A negative id is not an id at all.
    alice.send(
        &mut session,
        json!({"type": "trade", "stockId": -1, "action": "buy", "quantity": 1}),
    );
    assert_eq!(types(&alice.drain()), vec!["error"]);
}

#[test]
fn test_disconnect_removes_player_and_updates_leaderboard() {
    let mut session = create_test_session();
    let mut alice = TestClient::connect(&mut session);
    let mut bob = TestClient::connect(&mut session);
    let alice_id = alice.join(&mut session, "alice");
    bob.join(&mut session, "bob");
    alice.drain();

    alice.close(&mut session);

    assert!(!session.registry().contains(&alice_id));
    assert_eq!(session.connection_state(&alice.id), None);

    let frames = bob.drain();
    assert_eq!(types(&frames), vec!["leaderboard"]);
    assert_eq!(
        frames[0]["leaderboard"],
        json!([{"username": "bob", "balance": 500.0}])
    );

    // A second close event for the same connection changes nothing.
    alice.close(&mut session);
    assert!(bob.drain().is_empty());
    assert_eq!(session.registry().len(), 1);

    // Frames that race the close are dropped.
    alice.send(&mut session, json!({"type": "join", "username": "ghost"}));
    assert_eq!(session.registry().len(), 1);
}

#[test]
fn test_close_before_join_broadcasts_nothing() {
    let mut session = create_test_session();
    let lurker = TestClient::connect(&mut session);
    let mut watcher = TestClient::connect(&mut session);

    lurker.close(&mut session);

    assert!(watcher.drain().is_empty());
}

#[test]
fn test_rejoin_replaces_previous_player() {
    let mut session = create_test_session();
    let mut client = TestClient::connect(&mut session);

    let first = client.join(&mut session, "alice");
    let second = client.join(&mut session, "alice2");

    assert_ne!(first, second);
    assert!(!session.registry().contains(&first));
    assert!(session.registry().contains(&second));
    assert_eq!(session.registry().len(), 1);
}

#[test]
fn test_duplicate_usernames_are_allowed() {
    let mut session = create_test_session();
    let mut a = TestClient::connect(&mut session);
    let mut b = TestClient::connect(&mut session);

    let first = a.join(&mut session, "sam");
    let second = b.join(&mut session, "sam");

    assert_ne!(first, second);
    let board = session.snapshot().leaderboard;
    assert_eq!(board.len(), 2);
    assert!(board.iter().all(|row| row.username == "sam"));
}

#[test]
fn test_tick_broadcasts_prices_then_leaderboard() {
    let mut session = create_test_session();
    let mut alice = TestClient::connect(&mut session);
    let mut watcher = TestClient::connect(&mut session);
    alice.join(&mut session, "alice");
    watcher.drain();

    let before: Vec<f64> = session
        .market()
        .instruments()
        .iter()
        .map(|i| i.price())
        .collect();
    session.tick();

    for client in [&mut alice, &mut watcher] {
        let frames = client.drain();
        assert_eq!(types(&frames), vec!["prices", "leaderboard"]);

        let stocks = frames[0]["stocks"].as_array().unwrap();
        assert_eq!(stocks.len(), 8);
        for (stock, old) in stocks.iter().zip(before.iter()) {
            let price = stock["price"].as_f64().unwrap();
            let bound = stock["volatility"].as_f64().unwrap() * old * 0.1;
            assert!((price - old).abs() <= bound + 1e-9);
            assert!(price >= 0.1);
            assert_eq!(stock["history"].as_array().unwrap().len(), 2);
        }
    }
}

#[test]
fn test_dead_connection_does_not_block_broadcast() {
    let mut session = create_test_session();
    let mut alice = TestClient::connect(&mut session);
    let bob = TestClient::connect(&mut session);
    alice.join(&mut session, "alice");
    alice.drain();

    // Writer task of bob is gone but no close event has arrived yet.
    drop(bob.rx);
    session.tick();

    assert_eq!(types(&alice.drain()), vec!["prices", "leaderboard"]);
}

#[tokio::test(start_paused = true)]
async fn test_actor_ticks_on_its_own() {
    let session = create_test_session();
    let (handle, _task) = session.spawn(Duration::from_secs(2));

    let connection = ConnectionId::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    handle.connect(connection, tx).unwrap();

    // No client activity: the timer alone produces the next frames.
    let first: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    let second: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(first["type"], "prices");
    assert_eq!(second["type"], "leaderboard");
}

#[tokio::test]
async fn test_snapshot_through_handle() {
    let session = create_test_session();
    let (handle, _task) = session.spawn(Duration::from_secs(3600));

    let connection = ConnectionId::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    handle.connect(connection, tx).unwrap();
    handle
        .inbound(connection, json!({"type": "join", "username": "alice"}).to_string())
        .unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.players, 1);
    assert_eq!(snapshot.connections, 1);
    assert_eq!(snapshot.stocks.len(), 8);
    assert_eq!(snapshot.leaderboard[0].username, "alice");

    let init: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(init["type"], "init");

    handle.disconnect(connection).unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.players, 0);
    assert_eq!(snapshot.connections, 0);
}
