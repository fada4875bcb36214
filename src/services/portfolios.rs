//! Portfolio service: the write path for portfolios and their trade ledgers.
//!
//! Every ledger mutation recomputes the portfolio's return from the full
//! trade history and persists trade and return together, so readers never
//! see a portfolio whose published number disagrees with its trades.
//!
//! Writes to one portfolio are serialized through a per-portfolio lock held
//! across the whole read-recompute-write cycle. Writes to different
//! portfolios do not contend.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tracing::info;

use super::error::TradingError;
use super::ledger;
use super::sqlite_store::SqliteStore;
use crate::types::{Portfolio, Trade, TradeDraft, TradeReceipt, Visibility};

/// Portfolio management service.
#[derive(Clone)]
pub struct PortfolioService {
    /// SQLite store, the source of truth
    sqlite: Arc<SqliteStore>,
    /// Per-portfolio write locks (portfolio_id -> lock)
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl PortfolioService {
    /// Create a new portfolio service.
    pub fn new(sqlite: Arc<SqliteStore>) -> Self {
        Self {
            sqlite,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Shared access to the backing store.
    pub fn store(&self) -> Arc<SqliteStore> {
        Arc::clone(&self.sqlite)
    }

    fn portfolio_lock(&self, portfolio_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(portfolio_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Create a new portfolio for a user.
    pub fn create_portfolio(
        &self,
        owner_id: &str,
        name: &str,
        strategy: &str,
        visibility: Visibility,
    ) -> Result<Portfolio, TradingError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TradingError::InvalidPortfolio(
                "name must not be blank".to_string(),
            ));
        }

        let portfolio = Portfolio::new(
            owner_id.to_string(),
            name.to_string(),
            strategy.trim().to_string(),
            visibility,
        );
        self.sqlite.create_portfolio(&portfolio)?;

        info!("Created portfolio {} for {}", portfolio.id, owner_id);
        Ok(portfolio)
    }

    /// Get a portfolio by ID. Another user's private portfolio reads the
    /// same as a missing one, so existence does not leak.
    pub fn get_portfolio(
        &self,
        caller_id: &str,
        portfolio_id: &str,
    ) -> Result<Portfolio, TradingError> {
        let portfolio = self
            .sqlite
            .get_portfolio(portfolio_id)?
            .ok_or_else(|| TradingError::PortfolioNotFound(portfolio_id.to_string()))?;

        if portfolio.owner_id != caller_id && !portfolio.is_public() {
            return Err(TradingError::PortfolioNotFound(portfolio_id.to_string()));
        }
        Ok(portfolio)
    }

    /// Get all portfolios of a user, oldest first.
    pub fn get_user_portfolios(&self, owner_id: &str) -> Result<Vec<Portfolio>, TradingError> {
        Ok(self.sqlite.get_owner_portfolios(owner_id)?)
    }

    /// Get all public portfolios, oldest first.
    pub fn get_public_portfolios(&self) -> Result<Vec<Portfolio>, TradingError> {
        Ok(self.sqlite.get_public_portfolios()?)
    }

    /// Get a portfolio's trade ledger in execution order. The ledger is
    /// visible to its owner only, even on public portfolios.
    pub fn get_trades(
        &self,
        caller_id: &str,
        portfolio_id: &str,
    ) -> Result<Vec<Trade>, TradingError> {
        let portfolio = self
            .sqlite
            .get_portfolio(portfolio_id)?
            .ok_or_else(|| TradingError::PortfolioNotFound(portfolio_id.to_string()))?;

        if portfolio.owner_id != caller_id {
            if portfolio.is_public() {
                return Err(TradingError::PortfolioNotOwned(portfolio_id.to_string()));
            }
            return Err(TradingError::PortfolioNotFound(portfolio_id.to_string()));
        }

        Ok(self.sqlite.get_trades(portfolio_id)?)
    }

    /// Record a trade and refresh the portfolio's derived return.
    ///
    /// The new trade is validated by replaying the whole ledger with it
    /// appended. A sell that exceeds the position held at that point fails
    /// here and nothing is persisted.
    pub fn apply_trade(
        &self,
        caller_id: &str,
        portfolio_id: &str,
        draft: &TradeDraft,
    ) -> Result<TradeReceipt, TradingError> {
        validate_draft(draft)?;

        let lock = self.portfolio_lock(portfolio_id);
        let _guard = lock.lock().unwrap();

        let portfolio = self
            .sqlite
            .get_portfolio(portfolio_id)?
            .ok_or_else(|| TradingError::PortfolioNotFound(portfolio_id.to_string()))?;
        if portfolio.owner_id != caller_id {
            return Err(TradingError::PortfolioNotOwned(portfolio_id.to_string()));
        }

        let mut trades = self.sqlite.get_trades(portfolio_id)?;
        let trade = Trade::from_draft(portfolio_id, draft);
        trades.push(trade.clone());

        let summary = ledger::compute_return(&trades)?;
        self.sqlite
            .record_trade(&trade, summary.relative_return, trade.executed_at)?;

        info!(
            "Applied {} {} x{} @ {} to portfolio {}: return now {:.4}%",
            trade.side,
            trade.symbol,
            trade.quantity,
            trade.price,
            portfolio_id,
            summary.relative_return
        );

        Ok(TradeReceipt {
            trade,
            relative_return: summary.relative_return,
        })
    }

    /// Delete a trade and refresh the portfolio's derived return.
    ///
    /// The remaining ledger is replayed first. A removal that would leave a
    /// later sell exceeding its position is rejected and nothing changes.
    pub fn remove_trade(
        &self,
        caller_id: &str,
        portfolio_id: &str,
        trade_id: &str,
    ) -> Result<f64, TradingError> {
        let lock = self.portfolio_lock(portfolio_id);
        let _guard = lock.lock().unwrap();

        let portfolio = self
            .sqlite
            .get_portfolio(portfolio_id)?
            .ok_or_else(|| TradingError::PortfolioNotFound(portfolio_id.to_string()))?;
        if portfolio.owner_id != caller_id {
            return Err(TradingError::PortfolioNotOwned(portfolio_id.to_string()));
        }

        let trades = self.sqlite.get_trades(portfolio_id)?;
        if !trades.iter().any(|t| t.id == trade_id) {
            return Err(TradingError::TradeNotFound(trade_id.to_string()));
        }

        let remaining: Vec<Trade> = trades.into_iter().filter(|t| t.id != trade_id).collect();
        let summary = ledger::compute_return(&remaining)?;

        let now = chrono::Utc::now().timestamp_millis();
        let deleted = self
            .sqlite
            .delete_trade(portfolio_id, trade_id, summary.relative_return, now)?;
        if !deleted {
            return Err(TradingError::TradeNotFound(trade_id.to_string()));
        }

        info!(
            "Removed trade {} from portfolio {}: return now {:.4}%",
            trade_id, portfolio_id, summary.relative_return
        );
        Ok(summary.relative_return)
    }

    /// Change a portfolio's visibility.
    pub fn set_visibility(
        &self,
        caller_id: &str,
        portfolio_id: &str,
        visibility: Visibility,
    ) -> Result<Portfolio, TradingError> {
        let portfolio = self
            .sqlite
            .get_portfolio(portfolio_id)?
            .ok_or_else(|| TradingError::PortfolioNotFound(portfolio_id.to_string()))?;
        if portfolio.owner_id != caller_id {
            return Err(TradingError::PortfolioNotOwned(portfolio_id.to_string()));
        }

        let now = chrono::Utc::now().timestamp_millis();
        self.sqlite.set_visibility(portfolio_id, visibility, now)?;

        self.sqlite
            .get_portfolio(portfolio_id)?
            .ok_or_else(|| TradingError::PortfolioNotFound(portfolio_id.to_string()))
    }

    /// Delete a portfolio together with its trades and participations.
    pub fn delete_portfolio(&self, caller_id: &str, portfolio_id: &str) -> Result<(), TradingError> {
        let lock = self.portfolio_lock(portfolio_id);
        let _guard = lock.lock().unwrap();

        let portfolio = self
            .sqlite
            .get_portfolio(portfolio_id)?
            .ok_or_else(|| TradingError::PortfolioNotFound(portfolio_id.to_string()))?;
        if portfolio.owner_id != caller_id {
            return Err(TradingError::PortfolioNotOwned(portfolio_id.to_string()));
        }

        self.sqlite.delete_portfolio(portfolio_id)?;
        self.locks.remove(portfolio_id);

        info!("Deleted portfolio {} for {}", portfolio_id, caller_id);
        Ok(())
    }
}

/// Validate a trade draft before it touches the ledger.
fn validate_draft(draft: &TradeDraft) -> Result<(), TradingError> {
    if draft.symbol.trim().is_empty() {
        return Err(TradingError::InvalidTrade(
            "symbol must not be blank".to_string(),
        ));
    }
    if draft.quantity == 0 {
        return Err(TradingError::InvalidTrade(
            "quantity must be positive".to_string(),
        ));
    }
    if !draft.price.is_finite() || draft.price < 0.0 {
        return Err(TradingError::InvalidTrade(
            "price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}
