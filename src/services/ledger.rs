//! Trade ledger math.
//!
//! A portfolio's performance is derived from its full trade history on every
//! change rather than tracked incrementally, so there is no drift between the
//! stored trades and the published number.
//!
//! Model per symbol:
//! - buys fold into a weighted-average cost basis
//! - sells realize P&L against that basis and never reprice it
//! - the open position is marked to the symbol's last traded price
//!
//! The relative return is (realized + unrealized) P&L as a percentage of the
//! total amount ever spent on buys. Capital that was bought and later sold
//! stays in the denominator, so exiting a position does not inflate the
//! percentage.

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::TradingError;
use crate::types::{Trade, TradeSide};

/// Snapshot of a ledger's derived performance numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnSummary {
    /// Percentage return. Zero for a ledger with no buys.
    pub relative_return: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    /// Sum of quantity * price over all buys.
    pub total_invested: f64,
}

impl ReturnSummary {
    /// Summary of an empty ledger.
    pub fn flat() -> Self {
        Self {
            relative_return: 0.0,
            realized_pnl: 0.0,
            unrealized_pnl: 0.0,
            total_invested: 0.0,
        }
    }
}

/// Per-symbol running state while replaying a ledger.
#[derive(Debug, Default)]
struct SymbolBook {
    position: u32,
    cost_basis: f64,
    last_price: f64,
}

/// Replay a trade sequence and derive its performance summary.
///
/// Trades must be in execution order. A sell that exceeds the position held
/// at its point in the sequence fails the whole computation, which is how
/// oversells are rejected before anything is persisted. Keyed on a BTreeMap
/// so the unrealized sum always folds in the same symbol order and a replay
/// of the same ledger is bit-for-bit reproducible.
pub fn compute_return(trades: &[Trade]) -> Result<ReturnSummary, TradingError> {
    let mut books: BTreeMap<&str, SymbolBook> = BTreeMap::new();
    let mut realized_pnl = 0.0;
    let mut total_invested = 0.0;

    for trade in trades {
        if trade.quantity == 0 {
            return Err(TradingError::InvalidTrade(
                "trade quantity must be positive".to_string(),
            ));
        }

        let book = books.entry(trade.symbol.as_str()).or_default();
        let quantity = f64::from(trade.quantity);

        match trade.side {
            TradeSide::Buy => {
                let held = f64::from(book.position);
                book.cost_basis =
                    (held * book.cost_basis + quantity * trade.price) / (held + quantity);
                book.position += trade.quantity;
                total_invested += quantity * trade.price;
            }
            TradeSide::Sell => {
                if trade.quantity > book.position {
                    return Err(TradingError::InsufficientPosition {
                        symbol: trade.symbol.clone(),
                        requested: trade.quantity,
                        held: book.position,
                    });
                }
                realized_pnl += quantity * (trade.price - book.cost_basis);
                book.position -= trade.quantity;
            }
        }

        book.last_price = trade.price;
    }

    let unrealized_pnl: f64 = books
        .values()
        .map(|book| f64::from(book.position) * (book.last_price - book.cost_basis))
        .sum();

    let relative_return = if total_invested > 0.0 {
        ((realized_pnl + unrealized_pnl) / total_invested) * 100.0
    } else {
        0.0
    };

    Ok(ReturnSummary {
        relative_return,
        realized_pnl,
        unrealized_pnl,
        total_invested,
    })
}
