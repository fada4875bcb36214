//! Portfolio and trade types.
//!
//! A portfolio is a named trade ledger owned by a single user. Its
//! `relative_return` field is derived from the ledger and is only ever
//! written by the recompute path, never directly by a client.

use serde::{Deserialize, Serialize};

/// Portfolio visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Listed on the public leaderboard.
    Public,
    /// Visible to the owner only.
    Private,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Private
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Trade side (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// A simulated trading portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    /// Unique portfolio ID
    pub id: String,
    /// Owner's user ID (opaque, supplied by the auth collaborator)
    pub owner_id: String,
    /// Portfolio name
    pub name: String,
    /// Free-form strategy description
    pub strategy: String,
    /// Whether the portfolio appears on the leaderboard
    pub visibility: Visibility,
    /// Percentage return derived from the trade ledger
    pub relative_return: f64,
    /// When the portfolio was created (ms)
    pub created_at: i64,
    /// When the portfolio or its ledger last changed (ms)
    pub updated_at: i64,
}

impl Portfolio {
    /// Create a new empty portfolio. A fresh ledger has a return of zero.
    pub fn new(owner_id: String, name: String, strategy: String, visibility: Visibility) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id,
            name,
            strategy,
            visibility,
            relative_return: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// A single simulated trade. Immutable once recorded, except for deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    /// Unique trade ID
    pub id: String,
    /// Owning portfolio
    pub portfolio_id: String,
    /// Instrument symbol, uppercased
    pub symbol: String,
    /// Number of units, always positive
    pub quantity: u32,
    /// Unit price at execution, never negative
    pub price: f64,
    pub side: TradeSide,
    /// When the trade was recorded (ms)
    pub executed_at: i64,
}

impl Trade {
    /// Materialize a draft into a recorded trade for the given portfolio.
    pub fn from_draft(portfolio_id: &str, draft: &TradeDraft) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            portfolio_id: portfolio_id.to_string(),
            symbol: draft.symbol.trim().to_uppercase(),
            quantity: draft.quantity,
            price: draft.price,
            side: draft.side,
            executed_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Client request to record a trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDraft {
    pub symbol: String,
    pub quantity: u32,
    pub price: f64,
    pub side: TradeSide,
}

/// Result of recording a trade: the stored trade plus the portfolio's
/// freshly recomputed return.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeReceipt {
    pub trade: Trade,
    pub relative_return: f64,
}

/// One row of the public leaderboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    /// 1-based rank
    pub rank: u32,
    pub portfolio_id: String,
    pub owner_id: String,
    pub name: String,
    pub strategy: String,
    pub relative_return: f64,
    pub created_at: i64,
}
