//! Integration tests for leaderboard ranking

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bullpen::services::{LeaderboardService, PortfolioService, SqliteStore};
use bullpen::types::{TradeDraft, TradeSide, Visibility};

fn service() -> PortfolioService {
    PortfolioService::new(Arc::new(SqliteStore::new_in_memory().unwrap()))
}

fn draft(symbol: &str, quantity: u32, price: f64, side: TradeSide) -> TradeDraft {
    TradeDraft {
        symbol: symbol.to_string(),
        quantity,
        price,
        side,
    }
}

/// Create a portfolio and run its ledger to a known return.
fn seed_portfolio(
    service: &PortfolioService,
    owner: &str,
    name: &str,
    visibility: Visibility,
    trades: &[(u32, f64, TradeSide)],
) -> String {
    let portfolio = service
        .create_portfolio(owner, name, "", visibility)
        .unwrap();
    for (quantity, price, side) in trades {
        service
            .apply_trade(
                owner,
                &portfolio.id,
                &draft("AAPL", *quantity, *price, *side),
            )
            .unwrap();
    }
    portfolio.id
}

#[test]
fn test_ranking_follows_returns() {
    let portfolios = service();
    let leaderboard = LeaderboardService::new(portfolios.clone());

    let winner = seed_portfolio(
        &portfolios,
        "alice",
        "Winner",
        Visibility::Public,
        &[(10, 100.0, TradeSide::Buy), (10, 120.0, TradeSide::Sell)],
    );
    let middle = seed_portfolio(
        &portfolios,
        "bob",
        "Middle",
        Visibility::Public,
        &[(10, 100.0, TradeSide::Buy), (10, 120.0, TradeSide::Buy)],
    );
    let flat = seed_portfolio(
        &portfolios,
        "carol",
        "Flat",
        Visibility::Public,
        &[(10, 100.0, TradeSide::Buy)],
    );
    // The best performer of all stays private and must not appear.
    seed_portfolio(
        &portfolios,
        "dave",
        "Hidden",
        Visibility::Private,
        &[(1, 100.0, TradeSide::Buy), (1, 200.0, TradeSide::Sell)],
    );

    let rows = leaderboard.rank(None).unwrap();
    assert_eq!(rows.len(), 3);

    let ids: Vec<&str> = rows.iter().map(|r| r.portfolio_id.as_str()).collect();
    assert_eq!(ids, vec![winner.as_str(), middle.as_str(), flat.as_str()]);

    let ranks: Vec<u32> = rows.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);

    assert!((rows[0].relative_return - 20.0).abs() < 1e-9);
    assert!((rows[1].relative_return - 100.0 * 200.0 / 2200.0).abs() < 1e-9);
    assert_eq!(rows[2].relative_return, 0.0);
    assert_eq!(rows[0].owner_id, "alice");
}

#[test]
fn test_ties_rank_older_first() {
    let portfolios = service();
    let leaderboard = LeaderboardService::new(portfolios.clone());

    let older = seed_portfolio(&portfolios, "alice", "Older", Visibility::Public, &[]);
    thread::sleep(Duration::from_millis(10));
    let newer = seed_portfolio(&portfolios, "bob", "Newer", Visibility::Public, &[]);

    // Both sit at 0%, so age decides.
    let rows = leaderboard.rank(None).unwrap();
    assert_eq!(rows[0].portfolio_id, older);
    assert_eq!(rows[1].portfolio_id, newer);
}

#[test]
fn test_window_caps_results() {
    let portfolios = service();
    let leaderboard = LeaderboardService::with_window(portfolios.clone(), 2);

    for name in ["First", "Second", "Third"] {
        seed_portfolio(&portfolios, "alice", name, Visibility::Public, &[]);
    }

    assert_eq!(leaderboard.rank(None).unwrap().len(), 2);
    assert_eq!(leaderboard.rank(Some(1)).unwrap().len(), 1);
    // A requested limit cannot widen the window.
    assert_eq!(leaderboard.rank(Some(10)).unwrap().len(), 2);
}

#[test]
fn test_rank_is_stable_across_reads() {
    let portfolios = service();
    let leaderboard = LeaderboardService::new(portfolios.clone());

    seed_portfolio(
        &portfolios,
        "alice",
        "Winner",
        Visibility::Public,
        &[(10, 100.0, TradeSide::Buy), (10, 120.0, TradeSide::Sell)],
    );
    for name in ["Flat A", "Flat B", "Flat C"] {
        seed_portfolio(&portfolios, "bob", name, Visibility::Public, &[]);
    }

    let first: Vec<(u32, String)> = leaderboard
        .rank(None)
        .unwrap()
        .into_iter()
        .map(|r| (r.rank, r.portfolio_id))
        .collect();
    for _ in 0..5 {
        let again: Vec<(u32, String)> = leaderboard
            .rank(None)
            .unwrap()
            .into_iter()
            .map(|r| (r.rank, r.portfolio_id))
            .collect();
        assert_eq!(again, first);
    }
}
