//! Relational layout of the lineup store
//!
//! Used to build test fixtures and local databases; production databases are
//! provisioned elsewhere.

use rusqlite::Connection;

pub const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS teams (
    team_id INTEGER PRIMARY KEY,
    league_lk TEXT NOT NULL DEFAULT 'NBA',
    team_name TEXT NOT NULL,
    team_name_short TEXT NOT NULL DEFAULT '',
    team_nickname TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS players (
    player_id INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS roster (
    player_id INTEGER NOT NULL REFERENCES players(player_id),
    team_id INTEGER NOT NULL REFERENCES teams(team_id),
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    position TEXT NOT NULL,
    contract_type TEXT NOT NULL DEFAULT 'NBA',
    PRIMARY KEY (player_id, team_id)
);

CREATE TABLE IF NOT EXISTS game_schedule (
    game_id INTEGER PRIMARY KEY,
    home_id INTEGER NOT NULL REFERENCES teams(team_id),
    away_id INTEGER NOT NULL REFERENCES teams(team_id),
    home_score INTEGER NOT NULL,
    away_score INTEGER NOT NULL,
    game_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lineup (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    team_id INTEGER REFERENCES teams(team_id),
    player_id INTEGER REFERENCES players(player_id),
    game_id INTEGER REFERENCES game_schedule(game_id),
    lineup_num INTEGER NOT NULL,
    period INTEGER NOT NULL,
    time_in NUMERIC NOT NULL,
    time_out NUMERIC NOT NULL,
    CONSTRAINT check_time CHECK (time_out <= time_in),
    CONSTRAINT uq_lineup UNIQUE (team_id, player_id, game_id, period, time_in, lineup_num)
);

CREATE INDEX IF NOT EXISTS idx_lineup_key ON lineup (game_id, team_id, lineup_num);
CREATE INDEX IF NOT EXISTS idx_lineup_player ON lineup (player_id, game_id);
";

/// Create every table and index; safe to run repeatedly
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    log::info!("🔧 Lineup schema ready");
    Ok(())
}
