//! Quote API
//!
//! - GET /api/quotes/:symbol - Current price for an instrument

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::ApiResponse;
use crate::services::TradingError;
use crate::types::Quote;
use crate::AppState;

/// Create quote router.
pub fn router() -> Router<AppState> {
    Router::new().route("/:symbol", get(get_quote))
}

/// GET /api/quotes/:symbol
///
/// Look up the current quote for a symbol. Unknown symbols and upstream
/// outages without a seeded fallback both read as no data.
async fn get_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<Quote>>, TradingError> {
    let quote = state
        .quote_client
        .fetch_quote(&symbol)
        .await
        .ok_or_else(|| TradingError::NoQuoteData(symbol.trim().to_uppercase()))?;

    Ok(Json(ApiResponse { data: quote }))
}
