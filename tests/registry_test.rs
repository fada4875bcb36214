//! Integration tests for competition participation
//!
//! Tests cover:
//! - The return snapshot taken at join time
//! - Concurrent join attempts resolving to a single entry
//! - The close sweep freezing final returns exactly once

use std::sync::Arc;
use std::thread;

use bullpen::services::{
    CompetitionCatalog, ParticipationRegistry, PortfolioService, SqliteStore, TradingError,
};
use bullpen::types::{Competition, CompetitionClass, TradeDraft, TradeSide, Visibility};

const HOUR_MS: i64 = 60 * 60 * 1000;

fn competition(id: &str, starts_at: i64, ends_at: i64) -> Competition {
    Competition {
        id: id.to_string(),
        class: CompetitionClass::OneDay,
        name: id.to_string(),
        starts_at,
        ends_at,
        description: String::new(),
    }
}

fn setup(
    competitions: Vec<Competition>,
) -> (Arc<SqliteStore>, ParticipationRegistry, PortfolioService) {
    let store = Arc::new(SqliteStore::new_in_memory().unwrap());
    let registry = ParticipationRegistry::new(
        Arc::clone(&store),
        Arc::new(CompetitionCatalog::new(competitions)),
    );
    let portfolios = PortfolioService::new(Arc::clone(&store));
    (store, registry, portfolios)
}

fn draft(symbol: &str, quantity: u32, price: f64, side: TradeSide) -> TradeDraft {
    TradeDraft {
        symbol: symbol.to_string(),
        quantity,
        price,
        side,
    }
}

#[test]
fn test_concurrent_joins_resolve_to_one_entry() {
    let now = chrono::Utc::now().timestamp_millis();
    let (_store, registry, portfolios) =
        setup(vec![competition("open-now", now - HOUR_MS, now + HOUR_MS)]);

    let portfolio = portfolios
        .create_portfolio("user-1", "Growth", "", Visibility::Public)
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = registry.clone();
        let id = portfolio.id.clone();
        handles.push(thread::spawn(move || {
            registry.join("user-1", "open-now", &id)
        }));
    }
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let joined = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(joined, 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(
            result.as_ref().unwrap_err(),
            TradingError::AlreadyJoined(_)
        ));
    }

    let entries = registry.participations_for_user("user-1").unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].portfolio_id, portfolio.id);
}

#[test]
fn test_two_users_share_a_competition() {
    let now = chrono::Utc::now().timestamp_millis();
    let (_store, registry, portfolios) =
        setup(vec![competition("open-now", now - HOUR_MS, now + HOUR_MS)]);

    for user in ["user-1", "user-2"] {
        let portfolio = portfolios
            .create_portfolio(user, "Growth", "", Visibility::Public)
            .unwrap();
        registry.join(user, "open-now", &portfolio.id).unwrap();
        assert_eq!(registry.participations_for_user(user).unwrap().len(), 1);
    }
}

#[test]
fn test_initial_mark_is_frozen_at_join() {
    let now = chrono::Utc::now().timestamp_millis();
    let (_store, registry, portfolios) =
        setup(vec![competition("open-now", now - HOUR_MS, now + HOUR_MS)]);

    let portfolio = portfolios
        .create_portfolio("user-1", "Growth", "", Visibility::Public)
        .unwrap();
    portfolios
        .apply_trade(
            "user-1",
            &portfolio.id,
            &draft("AAPL", 10, 100.0, TradeSide::Buy),
        )
        .unwrap();
    portfolios
        .apply_trade(
            "user-1",
            &portfolio.id,
            &draft("AAPL", 10, 120.0, TradeSide::Sell),
        )
        .unwrap();

    let entry = registry.join("user-1", "open-now", &portfolio.id).unwrap();
    assert!((entry.initial_return - 20.0).abs() < 1e-9);

    // The portfolio keeps trading; its entry mark must not move.
    portfolios
        .apply_trade(
            "user-1",
            &portfolio.id,
            &draft("MSFT", 10, 200.0, TradeSide::Buy),
        )
        .unwrap();

    let entries = registry.participations_for_user("user-1").unwrap();
    assert!((entries[0].initial_return - 20.0).abs() < 1e-9);
    assert!(entries[0].final_return.is_none());
}

#[test]
fn test_sweep_freezes_final_return_once() {
    let now = chrono::Utc::now().timestamp_millis();
    let (store, registry, portfolios) =
        setup(vec![competition("ended", now - 2 * HOUR_MS, now - HOUR_MS)]);

    let portfolio = portfolios
        .create_portfolio("user-1", "Growth", "", Visibility::Public)
        .unwrap();
    // The entry predates the close; it was made while the window was open.
    store
        .join_participation("ended", &portfolio.id, "user-1", now - 2 * HOUR_MS)
        .unwrap();

    portfolios
        .apply_trade(
            "user-1",
            &portfolio.id,
            &draft("AAPL", 10, 100.0, TradeSide::Buy),
        )
        .unwrap();
    portfolios
        .apply_trade(
            "user-1",
            &portfolio.id,
            &draft("AAPL", 10, 120.0, TradeSide::Sell),
        )
        .unwrap();

    assert_eq!(registry.close_completed().unwrap(), 1);
    let entries = registry.participations_for_user("user-1").unwrap();
    let frozen = entries[0].final_return.unwrap();
    assert!((frozen - 20.0).abs() < 1e-9);

    // Later trading moves the portfolio but not the frozen result.
    portfolios
        .apply_trade(
            "user-1",
            &portfolio.id,
            &draft("AAPL", 10, 50.0, TradeSide::Buy),
        )
        .unwrap();
    assert_eq!(registry.close_completed().unwrap(), 0);

    let entries = registry.participations_for_user("user-1").unwrap();
    assert_eq!(entries[0].final_return.unwrap(), frozen);
}

#[test]
fn test_join_window_gating() {
    let now = chrono::Utc::now().timestamp_millis();
    let (_store, registry, portfolios) = setup(vec![
        competition("not-yet", now + HOUR_MS, now + 2 * HOUR_MS),
        competition("ended", now - 2 * HOUR_MS, now - HOUR_MS),
    ]);

    let portfolio = portfolios
        .create_portfolio("user-1", "Growth", "", Visibility::Public)
        .unwrap();

    for id in ["not-yet", "ended"] {
        let err = registry.join("user-1", id, &portfolio.id).unwrap_err();
        assert!(matches!(err, TradingError::CompetitionNotActive { .. }));
    }
    assert!(registry.participations_for_user("user-1").unwrap().is_empty());
}
