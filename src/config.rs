use chrono::NaiveDate;
use std::env;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite database path.
    pub database_path: String,
    /// Maximum number of leaderboard entries.
    pub leaderboard_size: usize,
    /// How often the participation sweep runs (seconds).
    pub sweep_interval_secs: u64,
    /// Quote fetch timeout (seconds).
    pub quote_timeout_secs: u64,
    /// Anchor date for the seeded competition roster. Defaults to today
    /// (UTC) when unset, so the roster starts fresh each deploy day.
    pub competition_anchor: Option<NaiveDate>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "bullpen.db".to_string()),
            leaderboard_size: env::var("LEADERBOARD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            quote_timeout_secs: env::var("QUOTE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            competition_anchor: env::var("COMPETITION_ANCHOR")
                .ok()
                .and_then(|v| parse_anchor(&v)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Parse an anchor date in YYYY-MM-DD form.
fn parse_anchor(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_anchor() {
        assert_eq!(
            parse_anchor("2026-08-01"),
            NaiveDate::from_ymd_opt(2026, 8, 1)
        );
        assert_eq!(parse_anchor(" 2026-08-01 "), NaiveDate::from_ymd_opt(2026, 8, 1));
        assert_eq!(parse_anchor("08/01/2026"), None);
        assert_eq!(parse_anchor("not-a-date"), None);
    }

    #[test]
    fn test_config_construction() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: ":memory:".to_string(),
            leaderboard_size: 10,
            sweep_interval_secs: 5,
            quote_timeout_secs: 3,
            competition_anchor: NaiveDate::from_ymd_opt(2026, 8, 1),
        };

        assert_eq!(config.port, 8080);
        assert_eq!(config.leaderboard_size, 10);
        assert!(config.competition_anchor.is_some());
    }
}
