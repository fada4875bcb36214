pub mod competitions;
pub mod health;
pub mod identity;
pub mod leaderboard;
pub mod portfolios;
pub mod quotes;

use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use serde::Serialize;

use crate::services::TradingError;
use crate::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/portfolios", portfolios::router())
        .nest("/api/competitions", competitions::router())
        .nest("/api/participations", competitions::participations_router())
        .nest("/api/leaderboard", leaderboard::router())
        .nest("/api/quotes", quotes::router())
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Convert TradingError to HTTP response.
///
/// The codes are stable identifiers for clients; the messages are free to
/// change.
impl IntoResponse for TradingError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self {
            TradingError::PortfolioNotFound(_) => (StatusCode::NOT_FOUND, "PORTFOLIO_NOT_FOUND"),
            TradingError::TradeNotFound(_) => (StatusCode::NOT_FOUND, "TRADE_NOT_FOUND"),
            TradingError::CompetitionNotFound(_) => {
                (StatusCode::NOT_FOUND, "COMPETITION_NOT_FOUND")
            }
            TradingError::InsufficientPosition { .. } => {
                (StatusCode::BAD_REQUEST, "INSUFFICIENT_POSITION")
            }
            TradingError::InvalidTrade(_) => (StatusCode::BAD_REQUEST, "INVALID_TRADE"),
            TradingError::InvalidPortfolio(_) => (StatusCode::BAD_REQUEST, "INVALID_PORTFOLIO"),
            TradingError::AlreadyJoined(_) => (StatusCode::CONFLICT, "ALREADY_JOINED"),
            TradingError::CompetitionNotActive { .. } => {
                (StatusCode::CONFLICT, "COMPETITION_NOT_ACTIVE")
            }
            TradingError::PortfolioNotOwned(_) => (StatusCode::FORBIDDEN, "PORTFOLIO_NOT_OWNED"),
            TradingError::NoQuoteData(_) => (StatusCode::NOT_FOUND, "NO_QUOTE_DATA"),
            TradingError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            TradingError::StoreUnavailable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORE_UNAVAILABLE")
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_serialization() {
        let response = ApiResponse { data: vec![1, 2, 3] };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"data":[1,2,3]}"#);
    }

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse {
            error: "Portfolio not found: p1".to_string(),
            code: "PORTFOLIO_NOT_FOUND".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"code\":\"PORTFOLIO_NOT_FOUND\""));
    }
}
