//! Portfolio API
//!
//! Endpoints for portfolios and their trade ledgers:
//!
//! - GET /api/portfolios - List the caller's portfolios
//! - POST /api/portfolios - Create a new portfolio
//! - GET /api/portfolios/:id - Get portfolio details
//! - PUT /api/portfolios/:id/visibility - Show or hide on the leaderboard
//! - DELETE /api/portfolios/:id - Delete a portfolio and everything attached
//!
//! Trades:
//! - GET /api/portfolios/:id/trades - List the ledger (owner only)
//! - POST /api/portfolios/:id/trades - Record a trade
//! - DELETE /api/portfolios/:id/trades/:trade_id - Remove a trade

use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::identity::CallerIdentity;
use crate::api::ApiResponse;
use crate::services::TradingError;
use crate::types::{Portfolio, Trade, TradeDraft, TradeReceipt, Visibility};
use crate::AppState;

/// Create portfolio router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_portfolios))
        .route("/", post(create_portfolio))
        .route("/:id", get(get_portfolio))
        .route("/:id", delete(delete_portfolio))
        .route("/:id/visibility", put(set_visibility))
        .route("/:id/trades", get(list_trades))
        .route("/:id/trades", post(record_trade))
        .route("/:id/trades/:trade_id", delete(remove_trade))
}

// =============================================================================
// Request / Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioRequest {
    pub name: String,
    pub strategy: Option<String>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVisibilityRequest {
    pub visibility: Visibility,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedTradeResponse {
    pub trade_id: String,
    /// The portfolio's return after the removal
    pub relative_return: f64,
}

// =============================================================================
// Portfolio Handlers
// =============================================================================

/// GET /api/portfolios
///
/// List the caller's portfolios, oldest first.
async fn list_portfolios(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<ApiResponse<Vec<Portfolio>>>, TradingError> {
    let portfolios = state.portfolio_service.get_user_portfolios(&caller.user_id)?;
    Ok(Json(ApiResponse { data: portfolios }))
}

/// POST /api/portfolios
///
/// Create a new portfolio. Visibility defaults to private.
async fn create_portfolio(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Json(request): Json<CreatePortfolioRequest>,
) -> Result<Json<ApiResponse<Portfolio>>, TradingError> {
    let portfolio = state.portfolio_service.create_portfolio(
        &caller.user_id,
        &request.name,
        request.strategy.as_deref().unwrap_or(""),
        request.visibility.unwrap_or_default(),
    )?;

    Ok(Json(ApiResponse { data: portfolio }))
}

/// GET /api/portfolios/:id
///
/// Get portfolio details. Public portfolios are visible to everyone;
/// private ones only to their owner.
async fn get_portfolio(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Portfolio>>, TradingError> {
    let portfolio = state.portfolio_service.get_portfolio(&caller.user_id, &id)?;
    Ok(Json(ApiResponse { data: portfolio }))
}

/// PUT /api/portfolios/:id/visibility
///
/// Show or hide the portfolio on the public leaderboard.
async fn set_visibility(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
    Json(request): Json<SetVisibilityRequest>,
) -> Result<Json<ApiResponse<Portfolio>>, TradingError> {
    let portfolio =
        state
            .portfolio_service
            .set_visibility(&caller.user_id, &id, request.visibility)?;
    Ok(Json(ApiResponse { data: portfolio }))
}

/// DELETE /api/portfolios/:id
///
/// Delete a portfolio together with its trades and competition entries.
async fn delete_portfolio(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>, TradingError> {
    state.portfolio_service.delete_portfolio(&caller.user_id, &id)?;
    Ok(Json(ApiResponse {
        data: DeletedResponse { success: true },
    }))
}

// =============================================================================
// Trade Handlers
// =============================================================================

/// GET /api/portfolios/:id/trades
///
/// List the portfolio's trade ledger in execution order. Owner only.
async fn list_trades(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Trade>>>, TradingError> {
    let trades = state.portfolio_service.get_trades(&caller.user_id, &id)?;
    Ok(Json(ApiResponse { data: trades }))
}

/// POST /api/portfolios/:id/trades
///
/// Record a trade. The response carries the stored trade and the
/// portfolio's refreshed return.
async fn record_trade(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
    Json(draft): Json<TradeDraft>,
) -> Result<Json<ApiResponse<TradeReceipt>>, TradingError> {
    let receipt = state
        .portfolio_service
        .apply_trade(&caller.user_id, &id, &draft)?;
    Ok(Json(ApiResponse { data: receipt }))
}

/// DELETE /api/portfolios/:id/trades/:trade_id
///
/// Remove a trade from the ledger.
async fn remove_trade(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((id, trade_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<RemovedTradeResponse>>, TradingError> {
    let relative_return =
        state
            .portfolio_service
            .remove_trade(&caller.user_id, &id, &trade_id)?;
    Ok(Json(ApiResponse {
        data: RemovedTradeResponse {
            trade_id,
            relative_return,
        },
    }))
}
