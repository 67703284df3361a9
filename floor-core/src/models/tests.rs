use super::*;

#[test]
fn test_instrument_wire_shape() {
    let inst = Instrument::new(InstrumentId::new(3), "GrowthTech Inc", RiskCategory::Moderate, 200.0, 0.25);
    let json = serde_json::to_value(&inst).unwrap();

    assert_eq!(json["id"], 3);
    assert_eq!(json["name"], "GrowthTech Inc");
    assert_eq!(json["type"], "Moderate");
    assert_eq!(json["price"], 200.0);
    assert_eq!(json["volatility"], 0.25);
    assert_eq!(json["history"], serde_json::json!([200.0]));
}

#[test]
fn test_apply_move_respects_floor() {
    let mut inst = Instrument::new(InstrumentId::new(1), "Penny", RiskCategory::Volatile, 0.5, 0.9);
    let price = inst.apply_move(-10.0, DEFAULT_HISTORY_LEN);

    assert_eq!(price, PRICE_FLOOR);
    assert_eq!(inst.price(), PRICE_FLOOR);
    assert_eq!(inst.history().back().copied(), Some(PRICE_FLOOR));
}

#[test]
fn test_history_evicts_oldest_first() {
    let mut inst = Instrument::new(InstrumentId::new(1), "Bond", RiskCategory::Safe, 100.0, 0.08);
    for step in 1..=25 {
        inst.apply_move(1.0, DEFAULT_HISTORY_LEN);
        assert!(inst.history().len() <= DEFAULT_HISTORY_LEN, "step {}", step);
    }

    // 26 prices were recorded (100..=125); only the newest 20 remain.
    assert_eq!(inst.history().len(), DEFAULT_HISTORY_LEN);
    assert_eq!(inst.history().front().copied(), Some(106.0));
    assert_eq!(inst.history().back().copied(), Some(125.0));
}

#[test]
fn test_default_catalog() {
    let catalog = default_catalog();
    assert_eq!(catalog.len(), 8);

    let ids: Vec<u32> = catalog.iter().map(|i| i.id().value()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);

    for inst in &catalog {
        assert!(inst.volatility() > 0.0 && inst.volatility() <= 1.0);
        assert_eq!(inst.history().len(), 1);
    }
}

#[test]
fn test_holdings_remove_requires_enough_units() {
    let mut holdings = Holdings::default();
    let id = InstrumentId::new(2);

    assert!(!holdings.remove(id, 1));
    holdings.add(id, 3);
    assert!(!holdings.remove(id, 4));
    assert_eq!(holdings.get_quantity(id), 3);
    assert!(holdings.remove(id, 3));
    assert_eq!(holdings.get_quantity(id), 0);
    assert!(holdings.is_empty());
}

#[test]
fn test_holdings_serialize_as_id_map() {
    let mut holdings = Holdings::default();
    holdings.add(InstrumentId::new(4), 2);
    holdings.add(InstrumentId::new(1), 7);

    let json = serde_json::to_string(&holdings).unwrap();
    assert_eq!(json, r#"{"1":7,"4":2}"#);
}

#[test]
fn test_player_buy_and_sell() {
    let mut player = Player::new(PlayerId::new("p1"), "alice", 500.0, ConnectionId::new());
    let id = InstrumentId::new(1);

    assert!(player.buy(id, 3, 300.0));
    assert_eq!(player.balance(), 200.0);
    assert!(!player.buy(id, 3, 300.0));
    assert_eq!(player.balance(), 200.0);

    assert!(!player.sell(id, 4, 400.0));
    assert!(player.sell(id, 2, 220.0));
    assert_eq!(player.balance(), 420.0);
    assert_eq!(player.holdings().get_quantity(id), 1);
}
