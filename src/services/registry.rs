//! Competition participation registry.
//!
//! Joining is gated in a fixed order: the competition must exist, must be
//! active at the moment of the attempt, and the portfolio must belong to the
//! caller. The store then performs the actual insert-if-absent, so racing
//! join attempts for the same user and competition resolve to exactly one
//! entry no matter how they interleave.

use std::sync::Arc;

use tracing::info;

use super::competitions::CompetitionCatalog;
use super::error::TradingError;
use super::sqlite_store::{ParticipationInsert, SqliteStore};
use crate::types::{CompetitionStatus, Participation};

/// Participation registry service.
#[derive(Clone)]
pub struct ParticipationRegistry {
    sqlite: Arc<SqliteStore>,
    catalog: Arc<CompetitionCatalog>,
}

impl ParticipationRegistry {
    /// Create a new registry over the given store and catalog.
    pub fn new(sqlite: Arc<SqliteStore>, catalog: Arc<CompetitionCatalog>) -> Self {
        Self { sqlite, catalog }
    }

    /// Enter a portfolio into a competition.
    ///
    /// The portfolio's current return is captured as the starting mark of
    /// the entry. A user holds at most one entry per competition; repeat
    /// attempts fail without touching the first entry.
    pub fn join(
        &self,
        user_id: &str,
        competition_id: &str,
        portfolio_id: &str,
    ) -> Result<Participation, TradingError> {
        let competition = self
            .catalog
            .get(competition_id)
            .ok_or_else(|| TradingError::CompetitionNotFound(competition_id.to_string()))?;

        let now = chrono::Utc::now().timestamp_millis();
        let status = competition.status_at(now);
        if status != CompetitionStatus::Active {
            return Err(TradingError::CompetitionNotActive {
                id: competition_id.to_string(),
                status,
            });
        }

        match self
            .sqlite
            .join_participation(competition_id, portfolio_id, user_id, now)?
        {
            ParticipationInsert::Inserted(participation) => {
                info!(
                    "User {} entered {} with portfolio {} at {:.4}%",
                    user_id, competition_id, portfolio_id, participation.initial_return
                );
                Ok(participation)
            }
            ParticipationInsert::AlreadyJoined => {
                Err(TradingError::AlreadyJoined(competition_id.to_string()))
            }
            ParticipationInsert::PortfolioMissing => {
                Err(TradingError::PortfolioNotFound(portfolio_id.to_string()))
            }
            ParticipationInsert::OwnerMismatch => {
                Err(TradingError::PortfolioNotOwned(portfolio_id.to_string()))
            }
        }
    }

    /// All of a user's entries, oldest first.
    pub fn participations_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Participation>, TradingError> {
        Ok(self.sqlite.get_participations(user_id)?)
    }

    /// Freeze final returns for every competition that has ended.
    ///
    /// Idempotent: entries already carrying a final return are left alone,
    /// so the sweep can run on a timer without moving anyone's result.
    /// Returns how many entries were closed.
    pub fn close_completed(&self) -> Result<usize, TradingError> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut closed = 0;

        for competition in self.catalog.competitions() {
            if competition.status_at(now) == CompetitionStatus::Completed {
                closed += self.sqlite.close_participations(&competition.id)?;
            }
        }

        if closed > 0 {
            info!("Participation sweep closed {} entries", closed);
        }
        Ok(closed)
    }
}
