//! Read-only SQLite lineup store
//!
//! Opens the database with the shared PRAGMAs, then locks the connection to
//! `query_only`. Clock columns are decimal seconds in storage and become
//! integer tenths (`GameClock`) on the way out.

use super::{LineupSource, StintScope};
use crate::error::{StintError, StintResult};
use crate::lineup_core::clock::GameClock;
use crate::lineup_core::dimensions::{Dimensions, GameResult, Player, Position};
use crate::lineup_core::interval::LineupInterval;
use crate::lineup_core::pagination::{parse_game_date, WideLineupCursor};
use crate::sqlite_pragma::apply_optimized_pragmas;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::time::Duration;

const INTERVAL_COLUMNS: &str =
    "l.game_id, l.team_id, l.player_id, l.period, l.lineup_num, l.time_in, l.time_out";

pub struct SqliteLineupStore {
    conn: Connection,
}

impl SqliteLineupStore {
    /// Open the store at `db_path`
    pub fn open(db_path: impl AsRef<Path>, busy_timeout: Duration) -> StintResult<Self> {
        let conn = Connection::open(db_path.as_ref())?;
        conn.busy_timeout(busy_timeout)?;
        let store = Self::from_connection(conn)?;

        log::info!("📥 Lineup store opened: {}", db_path.as_ref().display());
        Ok(store)
    }

    /// Wrap an existing connection; it becomes read-only from here on
    pub fn from_connection(conn: Connection) -> StintResult<Self> {
        apply_optimized_pragmas(&conn)?;

        // must come after the PRAGMAs, journal_mode needs write access
        conn.pragma_update(None, "query_only", "ON")?;

        Ok(Self { conn })
    }

    fn load_teams(&self, dims: &mut Dimensions) -> StintResult<()> {
        let mut stmt = self.conn.prepare("SELECT team_id, team_name FROM teams")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (team_id, team_name) = row?;
            dims.add_team(team_id, team_name);
        }
        Ok(())
    }

    fn load_players(&self, dims: &mut Dimensions) -> StintResult<()> {
        let mut stmt = self
            .conn
            .prepare("SELECT player_id, first_name, last_name FROM players")?;
        let rows = stmt.query_map([], |row| {
            Ok(Player {
                player_id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
            })
        })?;
        for player in rows {
            dims.add_player(player?);
        }
        Ok(())
    }

    fn load_games(&self, dims: &mut Dimensions) -> StintResult<()> {
        let mut stmt = self.conn.prepare(
            "SELECT game_id, home_id, away_id, home_score, away_score, game_date
             FROM game_schedule",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i32>(3)?,
                row.get::<_, i32>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        for row in rows {
            let (game_id, home_id, away_id, home_score, away_score, raw_date) = row?;
            let game_date = parse_game_date(&raw_date).ok_or_else(|| {
                StintError::data_integrity(format!(
                    "game {} has unreadable game_date '{}'",
                    game_id, raw_date
                ))
            })?;
            dims.add_game(GameResult {
                game_id,
                home_id,
                away_id,
                home_score,
                away_score,
                game_date,
            });
        }
        Ok(())
    }

    fn load_roster(&self, dims: &mut Dimensions) -> StintResult<()> {
        let mut stmt = self
            .conn
            .prepare("SELECT player_id, team_id, position FROM roster")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, String>(2)?))
        })?;
        for row in rows {
            let (player_id, team_id, position) = row?;
            dims.add_roster_entry(player_id, team_id, Position::parse(&position));
        }
        Ok(())
    }
}

fn interval_from_row(row: &Row<'_>) -> rusqlite::Result<LineupInterval> {
    Ok(LineupInterval {
        game_id: row.get(0)?,
        team_id: row.get(1)?,
        player_id: row.get(2)?,
        period: row.get(3)?,
        lineup_num: row.get(4)?,
        time_in: GameClock::from_seconds(row.get(5)?),
        time_out: GameClock::from_seconds(row.get(6)?),
    })
}

impl LineupSource for SqliteLineupStore {
    fn intervals(&self, scope: &StintScope) -> StintResult<Vec<LineupInterval>> {
        let sql = format!(
            "SELECT {} FROM lineup l
             WHERE (?1 IS NULL OR l.game_id = ?1)
               AND (?2 IS NULL OR l.team_id = ?2)
               AND (?3 IS NULL OR l.player_id = ?3)
             ORDER BY l.game_id, l.team_id, l.player_id, l.period, l.time_in DESC",
            INTERVAL_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![scope.game_id, scope.team_id, scope.player_id],
            interval_from_row,
        )?;
        let intervals = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        log::debug!("📥 Read {} lineup intervals for {:?}", intervals.len(), scope);
        Ok(intervals)
    }

    fn wide_lineup_intervals(
        &self,
        after: Option<&WideLineupCursor>,
        key_limit: usize,
    ) -> StintResult<Vec<LineupInterval>> {
        // Row-value keyset: the cursor predicate and the key bound both run in SQL
        let sql = format!(
            "SELECT {} FROM lineup l
             WHERE (l.game_id, l.team_id, l.lineup_num) IN (
                 SELECT DISTINCT game_id, team_id, lineup_num FROM lineup
                 WHERE ?1 IS NULL OR (game_id, team_id, lineup_num) > (?1, ?2, ?3)
                 ORDER BY game_id, team_id, lineup_num
                 LIMIT ?4
             )
             ORDER BY l.game_id, l.team_id, l.lineup_num, l.period, l.time_in DESC, l.player_id",
            INTERVAL_COLUMNS
        );
        let limit = i64::try_from(key_limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![
                after.map(|c| c.game_id),
                after.map(|c| c.team_id),
                after.map(|c| c.lineup_num),
                limit
            ],
            interval_from_row,
        )?;
        let intervals = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        log::debug!(
            "📥 Read {} wide lineup intervals (keys after {:?}, limit {})",
            intervals.len(),
            after,
            key_limit
        );
        Ok(intervals)
    }

    fn dimensions(&self) -> StintResult<Dimensions> {
        let mut dims = Dimensions::new();
        self.load_teams(&mut dims)?;
        self.load_players(&mut dims)?;
        self.load_games(&mut dims)?;
        self.load_roster(&mut dims)?;

        let (teams, players, games, roster) = dims.counts();
        log::debug!(
            "📥 Loaded dimensions: {} teams, {} players, {} games, {} roster entries",
            teams,
            players,
            games,
            roster
        );
        Ok(dims)
    }
}
