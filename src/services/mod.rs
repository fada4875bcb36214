pub mod competitions;
pub mod error;
pub mod leaderboard;
pub mod ledger;
pub mod portfolios;
pub mod registry;
pub mod sqlite_store;

pub use competitions::CompetitionCatalog;
pub use error::TradingError;
pub use leaderboard::{LeaderboardService, DEFAULT_WINDOW};
pub use ledger::{compute_return, ReturnSummary};
pub use portfolios::PortfolioService;
pub use registry::ParticipationRegistry;
pub use sqlite_store::{ParticipationInsert, SqliteStore};
