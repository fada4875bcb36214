//! Bullpen - Simulated stock trading competition server

pub mod api;
pub mod config;
pub mod services;
pub mod sources;
pub mod types;

use std::sync::Arc;

use config::Config;
use services::{CompetitionCatalog, LeaderboardService, ParticipationRegistry, PortfolioService};
use sources::YahooQuoteClient;

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub portfolio_service: PortfolioService,
    pub catalog: Arc<CompetitionCatalog>,
    pub registry: ParticipationRegistry,
    pub leaderboard: LeaderboardService,
    pub quote_client: Arc<YahooQuoteClient>,
}

// Re-export commonly used types
pub use services::TradingError;
pub use types::*;
