//! Leaderboard API
//!
//! - GET /api/leaderboard - Public portfolios ranked by relative return

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::ApiResponse;
use crate::services::TradingError;
use crate::types::LeaderboardRow;
use crate::AppState;

/// Create leaderboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_leaderboard))
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

/// GET /api/leaderboard
///
/// The public board, best return first. `limit` can shrink the board below
/// its configured window but never extend it.
async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<ApiResponse<Vec<LeaderboardRow>>>, TradingError> {
    let rows = state.leaderboard.rank(query.limit)?;
    Ok(Json(ApiResponse { data: rows }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaderboard_query_parsing() {
        let query: LeaderboardQuery = serde_urlencoded::from_str("limit=10").unwrap();
        assert_eq!(query.limit, Some(10));

        let query: LeaderboardQuery = serde_urlencoded::from_str("").unwrap();
        assert_eq!(query.limit, None);
    }
}
