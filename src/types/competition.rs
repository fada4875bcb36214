//! Competition and participation types.
//!
//! Competitions carry no status field. Status is derived from the clock
//! against the `[starts_at, ends_at)` window, so two readers with the same
//! clock always agree and nothing ever has to flip a stored flag.

use serde::{Deserialize, Serialize};

/// Duration class of a competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompetitionClass {
    #[serde(rename = "1day")]
    OneDay,
    #[serde(rename = "3days")]
    ThreeDay,
    #[serde(rename = "5days")]
    FiveDay,
}

impl CompetitionClass {
    pub fn duration_days(&self) -> i64 {
        match self {
            CompetitionClass::OneDay => 1,
            CompetitionClass::ThreeDay => 3,
            CompetitionClass::FiveDay => 5,
        }
    }

    /// Stable identifier fragment used in competition IDs.
    pub fn slug(&self) -> &'static str {
        match self {
            CompetitionClass::OneDay => "1day",
            CompetitionClass::ThreeDay => "3day",
            CompetitionClass::FiveDay => "5day",
        }
    }
}

impl std::fmt::Display for CompetitionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitionClass::OneDay => write!(f, "1day"),
            CompetitionClass::ThreeDay => write!(f, "3days"),
            CompetitionClass::FiveDay => write!(f, "5days"),
        }
    }
}

/// Lifecycle phase of a competition at some instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionStatus {
    Upcoming,
    Active,
    Completed,
}

impl std::fmt::Display for CompetitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitionStatus::Upcoming => write!(f, "upcoming"),
            CompetitionStatus::Active => write!(f, "active"),
            CompetitionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A scheduled competition window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    /// Stable ID, e.g. "1day-20260823"
    pub id: String,
    pub class: CompetitionClass,
    pub name: String,
    /// Window start (ms, inclusive)
    pub starts_at: i64,
    /// Window end (ms, exclusive)
    pub ends_at: i64,
    pub description: String,
}

impl Competition {
    /// Status at the given instant. The window is half-open: a join exactly
    /// at `starts_at` lands in an active competition, one exactly at
    /// `ends_at` does not.
    pub fn status_at(&self, now_ms: i64) -> CompetitionStatus {
        if now_ms < self.starts_at {
            CompetitionStatus::Upcoming
        } else if now_ms < self.ends_at {
            CompetitionStatus::Active
        } else {
            CompetitionStatus::Completed
        }
    }
}

/// Wire shape for listing competitions: the schedule plus its current status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionSummary {
    #[serde(flatten)]
    pub competition: Competition,
    pub status: CompetitionStatus,
}

/// A user's entry in a competition. The portfolio binding is permanent for
/// the lifetime of the entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub competition_id: String,
    pub portfolio_id: String,
    pub user_id: String,
    /// When the user joined (ms)
    pub joined_at: i64,
    /// Portfolio return captured at join time
    pub initial_return: f64,
    /// Portfolio return captured at competition close. Set exactly once.
    pub final_return: Option<f64>,
}

impl Participation {
    pub fn is_closed(&self) -> bool {
        self.final_return.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn competition(starts_at: i64, ends_at: i64) -> Competition {
        Competition {
            id: "1day-20260801".to_string(),
            class: CompetitionClass::OneDay,
            name: "One-Day Sprint".to_string(),
            starts_at,
            ends_at,
            description: String::new(),
        }
    }

    #[test]
    fn test_status_before_window_is_upcoming() {
        let c = competition(1_000, 2_000);
        assert_eq!(c.status_at(999), CompetitionStatus::Upcoming);
    }

    #[test]
    fn test_status_at_start_is_active() {
        let c = competition(1_000, 2_000);
        assert_eq!(c.status_at(1_000), CompetitionStatus::Active);
        assert_eq!(c.status_at(1_999), CompetitionStatus::Active);
    }

    #[test]
    fn test_status_at_end_is_completed() {
        // The window is half-open, so the end instant itself is already closed.
        let c = competition(1_000, 2_000);
        assert_eq!(c.status_at(2_000), CompetitionStatus::Completed);
        assert_eq!(c.status_at(5_000), CompetitionStatus::Completed);
    }

    #[test]
    fn test_class_serialization_matches_wire_names() {
        assert_eq!(serde_json::to_string(&CompetitionClass::OneDay).unwrap(), "\"1day\"");
        assert_eq!(serde_json::to_string(&CompetitionClass::ThreeDay).unwrap(), "\"3days\"");
        assert_eq!(serde_json::to_string(&CompetitionClass::FiveDay).unwrap(), "\"5days\"");
    }

    #[test]
    fn test_class_durations() {
        assert_eq!(CompetitionClass::OneDay.duration_days(), 1);
        assert_eq!(CompetitionClass::ThreeDay.duration_days(), 3);
        assert_eq!(CompetitionClass::FiveDay.duration_days(), 5);
    }

    #[test]
    fn test_participation_close_state() {
        let mut p = Participation {
            competition_id: "1day-20260801".to_string(),
            portfolio_id: "portfolio-1".to_string(),
            user_id: "user-1".to_string(),
            joined_at: 0,
            initial_return: 1.5,
            final_return: None,
        };
        assert!(!p.is_closed());

        p.final_return = Some(3.0);
        assert!(p.is_closed());
    }
}
