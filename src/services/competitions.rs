//! Competition catalog.
//!
//! The catalog is a fixed roster of scheduled competition windows, seeded at
//! startup. Nothing about a competition changes after seeding; its status is
//! always derived from the clock, so listings never disagree with join
//! checks made at the same instant.

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::types::{Competition, CompetitionClass, CompetitionSummary};

/// Fixed roster of competitions.
pub struct CompetitionCatalog {
    competitions: Vec<Competition>,
}

impl CompetitionCatalog {
    /// Create a catalog from explicit competition definitions.
    pub fn new(competitions: Vec<Competition>) -> Self {
        Self { competitions }
    }

    /// Seed the standard roster: one competition per duration class, all
    /// starting at UTC midnight of the anchor date. IDs are stable for a
    /// given anchor, so a restart reattaches to the same competitions.
    pub fn standard_roster(anchor: NaiveDate) -> Self {
        let date_tag = anchor.format("%Y%m%d").to_string();
        let starts = Utc.from_utc_datetime(&anchor.and_time(NaiveTime::MIN));

        let competitions = [
            (
                CompetitionClass::OneDay,
                "One-Day Sprint",
                "Twenty-four hours to make your best return.",
            ),
            (
                CompetitionClass::ThreeDay,
                "Three-Day Challenge",
                "Three days of trading, one winner.",
            ),
            (
                CompetitionClass::FiveDay,
                "Five-Day Marathon",
                "A full trading week to prove your strategy.",
            ),
        ]
        .into_iter()
        .map(|(class, name, description)| Competition {
            id: format!("{}-{}", class.slug(), date_tag),
            class,
            name: name.to_string(),
            starts_at: starts.timestamp_millis(),
            ends_at: (starts + Duration::days(class.duration_days())).timestamp_millis(),
            description: description.to_string(),
        })
        .collect();

        Self { competitions }
    }

    /// Look up a competition by ID.
    pub fn get(&self, id: &str) -> Option<&Competition> {
        self.competitions.iter().find(|c| c.id == id)
    }

    /// All competitions in roster order.
    pub fn competitions(&self) -> &[Competition] {
        &self.competitions
    }

    /// List all competitions with their status at the given instant.
    pub fn list(&self, now_ms: i64) -> Vec<CompetitionSummary> {
        self.competitions
            .iter()
            .map(|c| CompetitionSummary {
                competition: c.clone(),
                status: c.status_at(now_ms),
            })
            .collect()
    }
}
