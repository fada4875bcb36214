//! Public leaderboard.
//!
//! Ranks public portfolios by relative return. Ordering is total: ties on
//! the return fall back to creation time and then portfolio ID, so two
//! readers always see the same board and a refresh never reshuffles equal
//! entries.

use std::cmp::Ordering;

use super::error::TradingError;
use super::portfolios::PortfolioService;
use crate::types::LeaderboardRow;

/// Default number of entries on the board.
pub const DEFAULT_WINDOW: usize = 50;

/// Leaderboard service.
#[derive(Clone)]
pub struct LeaderboardService {
    portfolios: PortfolioService,
    window: usize,
}

impl LeaderboardService {
    /// Create a leaderboard with the default window.
    pub fn new(portfolios: PortfolioService) -> Self {
        Self::with_window(portfolios, DEFAULT_WINDOW)
    }

    /// Create a leaderboard holding at most `window` entries.
    pub fn with_window(portfolios: PortfolioService, window: usize) -> Self {
        Self { portfolios, window }
    }

    /// Rank public portfolios, best return first.
    ///
    /// A caller-supplied limit can shrink the board but never grow it past
    /// the window.
    pub fn rank(&self, limit: Option<usize>) -> Result<Vec<LeaderboardRow>, TradingError> {
        let mut portfolios = self.portfolios.get_public_portfolios()?;

        portfolios.sort_by(|a, b| {
            b.relative_return
                .partial_cmp(&a.relative_return)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        let cap = limit.map_or(self.window, |l| l.min(self.window));
        portfolios.truncate(cap);

        Ok(portfolios
            .into_iter()
            .enumerate()
            .map(|(i, p)| LeaderboardRow {
                rank: (i + 1) as u32,
                portfolio_id: p.id,
                owner_id: p.owner_id,
                name: p.name,
                strategy: p.strategy,
                relative_return: p.relative_return,
                created_at: p.created_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sqlite_store::SqliteStore;
    use crate::types::{Portfolio, Visibility};
    use std::sync::Arc;

    fn seeded_portfolio(
        id: &str,
        relative_return: f64,
        created_at: i64,
        visibility: Visibility,
    ) -> Portfolio {
        Portfolio {
            id: id.to_string(),
            owner_id: "user-1".to_string(),
            name: format!("Portfolio {}", id),
            strategy: String::new(),
            visibility,
            relative_return,
            created_at,
            updated_at: created_at,
        }
    }

    fn board(entries: &[Portfolio]) -> LeaderboardService {
        let store = Arc::new(SqliteStore::new_in_memory().unwrap());
        for portfolio in entries {
            store.create_portfolio(portfolio).unwrap();
        }
        LeaderboardService::new(PortfolioService::new(store))
    }

    #[test]
    fn test_ranks_by_return_descending() {
        let board = board(&[
            seeded_portfolio("a", 1.0, 100, Visibility::Public),
            seeded_portfolio("b", 7.5, 100, Visibility::Public),
            seeded_portfolio("c", -2.0, 100, Visibility::Public),
        ]);

        let rows = board.rank(None).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.portfolio_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[2].rank, 3);
    }

    #[test]
    fn test_ties_break_on_age_then_id() {
        let board = board(&[
            seeded_portfolio("z", 5.0, 200, Visibility::Public),
            seeded_portfolio("m", 5.0, 100, Visibility::Public),
            seeded_portfolio("a", 5.0, 200, Visibility::Public),
        ]);

        let rows = board.rank(None).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.portfolio_id.as_str()).collect();
        // Oldest first; equal age falls back to ID order.
        assert_eq!(ids, vec!["m", "a", "z"]);
    }

    #[test]
    fn test_private_portfolios_never_appear() {
        let board = board(&[
            seeded_portfolio("a", 50.0, 100, Visibility::Private),
            seeded_portfolio("b", 1.0, 100, Visibility::Public),
        ]);

        let rows = board.rank(None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].portfolio_id, "b");
    }

    #[test]
    fn test_window_caps_the_board() {
        let store = Arc::new(SqliteStore::new_in_memory().unwrap());
        for i in 0..10 {
            store
                .create_portfolio(&seeded_portfolio(
                    &format!("p{:02}", i),
                    i as f64,
                    100,
                    Visibility::Public,
                ))
                .unwrap();
        }
        let board = LeaderboardService::with_window(PortfolioService::new(store), 3);

        assert_eq!(board.rank(None).unwrap().len(), 3);
        // A limit below the window shrinks the board.
        assert_eq!(board.rank(Some(2)).unwrap().len(), 2);
        // A limit above the window does not grow it.
        assert_eq!(board.rank(Some(100)).unwrap().len(), 3);
    }

    #[test]
    fn test_ranking_is_stable_across_reads() {
        let board = board(&[
            seeded_portfolio("a", 5.0, 100, Visibility::Public),
            seeded_portfolio("b", 5.0, 100, Visibility::Public),
            seeded_portfolio("c", 5.0, 100, Visibility::Public),
        ]);

        let first = board.rank(None).unwrap();
        let second = board.rank(None).unwrap();
        let first_ids: Vec<&str> = first.iter().map(|r| r.portfolio_id.as_str()).collect();
        let second_ids: Vec<&str> = second.iter().map(|r| r.portfolio_id.as_str()).collect();
        assert_eq!(first_ids, second_ids);
    }
}
