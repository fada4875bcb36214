//! SQLite persistence layer for portfolios, trades, and participations.
//!
//! The database is the source of truth. Services recompute derived numbers
//! from the trade ledger and write them back here; nothing is cached in a
//! way that can outlive or contradict these tables.
//!
//! Writes that must be seen together (a trade plus the portfolio's refreshed
//! return, a competition join plus its captured starting return) run inside
//! a single transaction.

use crate::types::{Participation, Portfolio, Trade, TradeSide, Visibility};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Outcome of an attempted competition join.
///
/// The uniqueness check, the ownership check, and the starting-return
/// snapshot all happen inside one transaction, so callers get exactly one
/// of these and the table never holds a second row for the same user and
/// competition.
#[derive(Debug)]
pub enum ParticipationInsert {
    Inserted(Participation),
    AlreadyJoined,
    PortfolioMissing,
    OwnerMismatch,
}

/// SQLite store for trading competition data.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create a new SQLite store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("SQLite store initialized");
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub fn new_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory SQLite store initialized");
        Ok(store)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        // Portfolios table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS portfolios (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                strategy TEXT NOT NULL DEFAULT '',
                visibility TEXT NOT NULL DEFAULT 'private',
                relative_return REAL NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_portfolios_owner ON portfolios(owner_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_portfolios_visibility ON portfolios(visibility)",
            [],
        )?;

        // Trades table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS trades (
                id TEXT PRIMARY KEY,
                portfolio_id TEXT NOT NULL,
                symbol TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                price REAL NOT NULL,
                side TEXT NOT NULL,
                executed_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_trades_portfolio
             ON trades(portfolio_id, executed_at)",
            [],
        )?;

        // Participations table. The composite primary key is what makes a
        // join an insert-if-absent: a second row for the same user and
        // competition cannot exist.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS participations (
                user_id TEXT NOT NULL,
                competition_id TEXT NOT NULL,
                portfolio_id TEXT NOT NULL,
                joined_at INTEGER NOT NULL,
                initial_return REAL NOT NULL,
                final_return REAL,
                PRIMARY KEY (user_id, competition_id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_participations_competition
             ON participations(competition_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_participations_portfolio
             ON participations(portfolio_id)",
            [],
        )?;

        info!("SQLite schema initialized");
        Ok(())
    }

    // ========== Portfolio Methods ==========

    /// Insert a new portfolio.
    pub fn create_portfolio(&self, portfolio: &Portfolio) -> Result<(), rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO portfolios
             (id, owner_id, name, strategy, visibility, relative_return, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                portfolio.id,
                portfolio.owner_id,
                portfolio.name,
                portfolio.strategy,
                portfolio.visibility.to_string(),
                portfolio.relative_return,
                portfolio.created_at,
                portfolio.updated_at,
            ],
        )?;

        debug!("Saved portfolio {} for {}", portfolio.id, portfolio.owner_id);
        Ok(())
    }

    /// Get a portfolio by ID.
    pub fn get_portfolio(&self, id: &str) -> Result<Option<Portfolio>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, owner_id, name, strategy, visibility, relative_return,
                    created_at, updated_at
             FROM portfolios WHERE id = ?1",
            params![id],
            portfolio_from_row,
        );

        match result {
            Ok(portfolio) => Ok(Some(portfolio)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get all portfolios belonging to an owner, oldest first.
    pub fn get_owner_portfolios(&self, owner_id: &str) -> Result<Vec<Portfolio>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, owner_id, name, strategy, visibility, relative_return,
                    created_at, updated_at
             FROM portfolios WHERE owner_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;

        let portfolios = stmt
            .query_map(params![owner_id], portfolio_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(portfolios)
    }

    /// Get all public portfolios, oldest first.
    pub fn get_public_portfolios(&self) -> Result<Vec<Portfolio>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, owner_id, name, strategy, visibility, relative_return,
                    created_at, updated_at
             FROM portfolios WHERE visibility = 'public'
             ORDER BY created_at ASC, id ASC",
        )?;

        let portfolios = stmt
            .query_map([], portfolio_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(portfolios)
    }

    /// Change a portfolio's visibility. Returns false if the portfolio does
    /// not exist.
    pub fn set_visibility(
        &self,
        id: &str,
        visibility: Visibility,
        updated_at: i64,
    ) -> Result<bool, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        let changed = conn.execute(
            "UPDATE portfolios SET visibility = ?1, updated_at = ?2 WHERE id = ?3",
            params![visibility.to_string(), updated_at, id],
        )?;

        Ok(changed > 0)
    }

    /// Delete a portfolio together with its trades and participations.
    /// Returns false if the portfolio did not exist.
    pub fn delete_portfolio(&self, id: &str) -> Result<bool, rusqlite::Error> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM trades WHERE portfolio_id = ?1", params![id])?;
        tx.execute(
            "DELETE FROM participations WHERE portfolio_id = ?1",
            params![id],
        )?;
        let deleted = tx.execute("DELETE FROM portfolios WHERE id = ?1", params![id])?;

        tx.commit()?;
        Ok(deleted > 0)
    }

    // ========== Trade Methods ==========

    /// Get a portfolio's trades in execution order. Trades recorded in the
    /// same millisecond keep their insertion order.
    pub fn get_trades(&self, portfolio_id: &str) -> Result<Vec<Trade>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, portfolio_id, symbol, quantity, price, side, executed_at
             FROM trades WHERE portfolio_id = ?1
             ORDER BY executed_at ASC, rowid ASC",
        )?;

        let trades = stmt
            .query_map(params![portfolio_id], trade_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(trades)
    }

    /// Insert a trade and refresh the owning portfolio's derived return in
    /// one transaction, so no reader sees one without the other.
    pub fn record_trade(
        &self,
        trade: &Trade,
        relative_return: f64,
        updated_at: i64,
    ) -> Result<(), rusqlite::Error> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO trades (id, portfolio_id, symbol, quantity, price, side, executed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                trade.id,
                trade.portfolio_id,
                trade.symbol,
                trade.quantity,
                trade.price,
                trade.side.to_string(),
                trade.executed_at,
            ],
        )?;
        tx.execute(
            "UPDATE portfolios SET relative_return = ?1, updated_at = ?2 WHERE id = ?3",
            params![relative_return, updated_at, trade.portfolio_id],
        )?;

        tx.commit()?;
        debug!(
            "Recorded {} {} x{} @ {} on portfolio {}",
            trade.side, trade.symbol, trade.quantity, trade.price, trade.portfolio_id
        );
        Ok(())
    }

    /// Delete a trade and refresh the owning portfolio's derived return in
    /// one transaction. Returns false if the trade did not exist.
    pub fn delete_trade(
        &self,
        portfolio_id: &str,
        trade_id: &str,
        relative_return: f64,
        updated_at: i64,
    ) -> Result<bool, rusqlite::Error> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let deleted = tx.execute(
            "DELETE FROM trades WHERE id = ?1 AND portfolio_id = ?2",
            params![trade_id, portfolio_id],
        )?;
        if deleted == 0 {
            return Ok(false);
        }

        tx.execute(
            "UPDATE portfolios SET relative_return = ?1, updated_at = ?2 WHERE id = ?3",
            params![relative_return, updated_at, portfolio_id],
        )?;

        tx.commit()?;
        debug!("Deleted trade {} from portfolio {}", trade_id, portfolio_id);
        Ok(true)
    }

    // ========== Participation Methods ==========

    /// Join a competition: check ownership, capture the portfolio's current
    /// return as the starting mark, and insert the participation row, all in
    /// one transaction. Concurrent attempts for the same user and competition
    /// resolve to exactly one inserted row.
    pub fn join_participation(
        &self,
        competition_id: &str,
        portfolio_id: &str,
        user_id: &str,
        joined_at: i64,
    ) -> Result<ParticipationInsert, rusqlite::Error> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let snapshot = tx.query_row(
            "SELECT owner_id, relative_return FROM portfolios WHERE id = ?1",
            params![portfolio_id],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
        );
        let (owner_id, initial_return) = match snapshot {
            Ok(pair) => pair,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Ok(ParticipationInsert::PortfolioMissing)
            }
            Err(e) => return Err(e),
        };
        if owner_id != user_id {
            return Ok(ParticipationInsert::OwnerMismatch);
        }

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO participations
             (user_id, competition_id, portfolio_id, joined_at, initial_return, final_return)
             VALUES (?1, ?2, ?3, ?4, ?5, NULL)",
            params![user_id, competition_id, portfolio_id, joined_at, initial_return],
        )?;
        if inserted == 0 {
            return Ok(ParticipationInsert::AlreadyJoined);
        }

        tx.commit()?;
        debug!(
            "User {} joined {} with portfolio {}",
            user_id, competition_id, portfolio_id
        );

        Ok(ParticipationInsert::Inserted(Participation {
            competition_id: competition_id.to_string(),
            portfolio_id: portfolio_id.to_string(),
            user_id: user_id.to_string(),
            joined_at,
            initial_return,
            final_return: None,
        }))
    }

    /// Get all of a user's participations, oldest first.
    pub fn get_participations(&self, user_id: &str) -> Result<Vec<Participation>, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT competition_id, portfolio_id, user_id, joined_at, initial_return, final_return
             FROM participations WHERE user_id = ?1
             ORDER BY joined_at ASC, competition_id ASC",
        )?;

        let participations = stmt
            .query_map(params![user_id], participation_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(participations)
    }

    /// Freeze the final return of every still-open participation in a
    /// competition. Rows that already have a final return are untouched, so
    /// the sweep can run repeatedly without moving anyone's result. Falls
    /// back to the starting mark if the portfolio has since been deleted.
    /// Returns how many rows were closed.
    pub fn close_participations(&self, competition_id: &str) -> Result<usize, rusqlite::Error> {
        let conn = self.conn.lock().unwrap();

        let closed = conn.execute(
            "UPDATE participations
             SET final_return = COALESCE(
                 (SELECT relative_return FROM portfolios
                  WHERE portfolios.id = participations.portfolio_id),
                 initial_return)
             WHERE competition_id = ?1 AND final_return IS NULL",
            params![competition_id],
        )?;

        if closed > 0 {
            info!("Closed {} participations in {}", closed, competition_id);
        }
        Ok(closed)
    }
}

/// Map a portfolios row.
fn portfolio_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Portfolio> {
    Ok(Portfolio {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        strategy: row.get(3)?,
        visibility: parse_visibility(&row.get::<_, String>(4)?),
        relative_return: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Map a trades row.
fn trade_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Trade> {
    Ok(Trade {
        id: row.get(0)?,
        portfolio_id: row.get(1)?,
        symbol: row.get(2)?,
        quantity: row.get(3)?,
        price: row.get(4)?,
        side: parse_side(&row.get::<_, String>(5)?),
        executed_at: row.get(6)?,
    })
}

/// Map a participations row.
fn participation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Participation> {
    Ok(Participation {
        competition_id: row.get(0)?,
        portfolio_id: row.get(1)?,
        user_id: row.get(2)?,
        joined_at: row.get(3)?,
        initial_return: row.get(4)?,
        final_return: row.get(5)?,
    })
}

/// Parse visibility string to Visibility.
fn parse_visibility(s: &str) -> Visibility {
    match s {
        "public" => Visibility::Public,
        _ => Visibility::Private,
    }
}

/// Parse side string to TradeSide.
fn parse_side(s: &str) -> TradeSide {
    match s {
        "sell" => TradeSide::Sell,
        _ => TradeSide::Buy,
    }
}
