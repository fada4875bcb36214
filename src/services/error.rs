//! Error type shared by the trading, competition, and leaderboard services.

use thiserror::Error;

/// Errors produced by the trading domain.
#[derive(Debug, Clone, Error)]
pub enum TradingError {
    #[error("Portfolio not found: {0}")]
    PortfolioNotFound(String),

    #[error("Trade not found: {0}")]
    TradeNotFound(String),

    #[error("Competition not found: {0}")]
    CompetitionNotFound(String),

    #[error("Insufficient position in {symbol}: tried to sell {requested}, hold {held}")]
    InsufficientPosition {
        symbol: String,
        requested: u32,
        held: u32,
    },

    #[error("Invalid trade: {0}")]
    InvalidTrade(String),

    #[error("Invalid portfolio: {0}")]
    InvalidPortfolio(String),

    #[error("Already joined competition {0}")]
    AlreadyJoined(String),

    #[error("Competition {id} is not active: status is {status}")]
    CompetitionNotActive {
        id: String,
        status: crate::types::CompetitionStatus,
    },

    #[error("Portfolio {0} belongs to another user")]
    PortfolioNotOwned(String),

    #[error("No quote data available for {0}")]
    NoQuoteData(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<rusqlite::Error> for TradingError {
    fn from(e: rusqlite::Error) -> Self {
        TradingError::StoreUnavailable(e.to_string())
    }
}
