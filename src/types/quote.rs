//! Quote types shared between the price source and the API layer.

use serde::{Deserialize, Serialize};

/// A point-in-time price for one instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Instrument symbol, uppercased
    pub symbol: String,
    /// Most recent price
    pub price: f64,
    /// Quote currency, e.g. "USD"
    pub currency: String,
    /// Previous session close
    pub previous_close: f64,
    /// Absolute change against the previous close
    pub price_change: f64,
    /// Percentage change against the previous close
    pub change_percent: f64,
    /// When the quote was produced (ms)
    pub as_of: i64,
}

impl Quote {
    /// Build a quote from a price and the previous close, deriving the
    /// change fields.
    pub fn from_prices(symbol: &str, price: f64, previous_close: f64, currency: &str) -> Self {
        let price_change = price - previous_close;
        let change_percent = if previous_close != 0.0 {
            (price_change / previous_close) * 100.0
        } else {
            0.0
        };

        Self {
            symbol: symbol.to_uppercase(),
            price,
            currency: currency.to_string(),
            previous_close,
            price_change,
            change_percent,
            as_of: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_fields_derived_from_previous_close() {
        let quote = Quote::from_prices("aapl", 110.0, 100.0, "USD");

        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.price_change, 10.0);
        assert_eq!(quote.change_percent, 10.0);
    }

    #[test]
    fn test_zero_previous_close_gives_zero_percent() {
        let quote = Quote::from_prices("NEW", 50.0, 0.0, "USD");
        assert_eq!(quote.change_percent, 0.0);
    }
}
