//! Competition API
//!
//! - GET /api/competitions - List competitions with their current status
//! - POST /api/competitions/:id/join - Enter a portfolio into a competition
//! - GET /api/participations - List the caller's competition entries

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::identity::CallerIdentity;
use crate::api::ApiResponse;
use crate::services::TradingError;
use crate::types::{CompetitionSummary, Participation};
use crate::AppState;

/// Create competition router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_competitions))
        .route("/:id/join", post(join_competition))
}

/// Create participations router.
pub fn participations_router() -> Router<AppState> {
    Router::new().route("/", get(list_participations))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub portfolio_id: String,
}

/// GET /api/competitions
///
/// List all competitions. Status is computed against the clock at request
/// time, so a competition listed as active is joinable right now.
async fn list_competitions(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<CompetitionSummary>>> {
    let now = chrono::Utc::now().timestamp_millis();
    let competitions = state.catalog.list(now);
    Json(ApiResponse { data: competitions })
}

/// POST /api/competitions/:id/join
///
/// Enter one of the caller's portfolios into an active competition. At most
/// one entry per user and competition; the portfolio binding is permanent.
async fn join_competition(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
    Json(request): Json<JoinRequest>,
) -> Result<Json<ApiResponse<Participation>>, TradingError> {
    let participation = state
        .registry
        .join(&caller.user_id, &id, &request.portfolio_id)?;
    Ok(Json(ApiResponse {
        data: participation,
    }))
}

/// GET /api/participations
///
/// List the caller's competition entries, oldest first.
async fn list_participations(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<ApiResponse<Vec<Participation>>>, TradingError> {
    let participations = state.registry.participations_for_user(&caller.user_id)?;
    Ok(Json(ApiResponse {
        data: participations,
    }))
}
