//! Team, player, game and roster lookups consumed by the engine

use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Listed roster position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Position {
    PG,
    SG,
    SF,
    PF,
    C,
    Other(String),
}

impl Position {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "PG" => Position::PG,
            "SG" => Position::SG,
            "SF" => Position::SF,
            "PF" => Position::PF,
            "C" => Position::C,
            other => Position::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Position::PG => "PG",
            Position::SG => "SG",
            Position::SF => "SF",
            Position::PF => "PF",
            Position::C => "C",
            Position::Other(s) => s.as_str(),
        }
    }

    /// Display rank for wide lineup slots: PG=1 .. C=5, anything else 6
    pub fn rank(&self) -> u8 {
        match self {
            Position::PG => 1,
            Position::SG => 2,
            Position::SF => 3,
            Position::PF => 4,
            Position::C => 5,
            Position::Other(_) => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    Win,
    Loss,
}

/// Schedule row with the final score
#[derive(Debug, Clone, PartialEq)]
pub struct GameResult {
    pub game_id: i64,
    pub home_id: i64,
    pub away_id: i64,
    pub home_score: i32,
    pub away_score: i32,
    pub game_date: NaiveDateTime,
}

impl GameResult {
    /// `Win` only when `team_id` outscored the other side; ties are losses
    pub fn outcome_for(&self, team_id: i64) -> GameOutcome {
        let won = (team_id == self.home_id && self.home_score > self.away_score)
            || (team_id == self.away_id && self.away_score > self.home_score);
        if won {
            GameOutcome::Win
        } else {
            GameOutcome::Loss
        }
    }

    pub fn opponent_of(&self, team_id: i64) -> i64 {
        if team_id == self.home_id {
            self.away_id
        } else {
            self.home_id
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub player_id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Lookups the engine needs from the dimension tables
pub trait DimensionLookup {
    fn team_name(&self, team_id: i64) -> Option<&str>;
    fn player_name(&self, player_id: i64) -> Option<String>;
    fn game(&self, game_id: i64) -> Option<&GameResult>;
    fn position(&self, player_id: i64, team_id: i64) -> Option<&Position>;
}

/// In-memory snapshot of the dimension tables for one request
#[derive(Debug, Clone, Default)]
pub struct Dimensions {
    teams: HashMap<i64, String>,
    players: HashMap<i64, Player>,
    games: HashMap<i64, GameResult>,
    roster: HashMap<(i64, i64), Position>,
}

impl Dimensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_team(&mut self, team_id: i64, team_name: impl Into<String>) {
        self.teams.insert(team_id, team_name.into());
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.insert(player.player_id, player);
    }

    pub fn add_game(&mut self, game: GameResult) {
        self.games.insert(game.game_id, game);
    }

    pub fn add_roster_entry(&mut self, player_id: i64, team_id: i64, position: Position) {
        self.roster.insert((player_id, team_id), position);
    }

    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (self.teams.len(), self.players.len(), self.games.len(), self.roster.len())
    }
}

impl DimensionLookup for Dimensions {
    fn team_name(&self, team_id: i64) -> Option<&str> {
        self.teams.get(&team_id).map(String::as_str)
    }

    fn player_name(&self, player_id: i64) -> Option<String> {
        self.players.get(&player_id).map(Player::full_name)
    }

    fn game(&self, game_id: i64) -> Option<&GameResult> {
        self.games.get(&game_id)
    }

    fn position(&self, player_id: i64, team_id: i64) -> Option<&Position> {
        self.roster.get(&(player_id, team_id))
    }
}
