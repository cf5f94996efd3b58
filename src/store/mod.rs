//! Storage collaborator: raw lineup rows and dimension tables
//!
//! The core never writes. [`LineupSource`] is the seam it reads through;
//! [`SqliteLineupStore`] is the production implementation.

pub mod schema;
pub mod sqlite_reader;

pub use schema::create_schema;
pub use sqlite_reader::SqliteLineupStore;

use crate::error::{StintError, StintResult};
use crate::lineup_core::dimensions::Dimensions;
use crate::lineup_core::interval::LineupInterval;
use crate::lineup_core::pagination::WideLineupCursor;
use std::collections::HashMap;

/// Optional filters narrowing which raw rows a request reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StintScope {
    pub game_id: Option<i64>,
    pub team_id: Option<i64>,
    pub player_id: Option<i64>,
}

impl StintScope {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn game(game_id: i64) -> Self {
        Self {
            game_id: Some(game_id),
            ..Self::default()
        }
    }

    pub fn player(player_id: i64) -> Self {
        Self {
            player_id: Some(player_id),
            ..Self::default()
        }
    }

    pub fn from_params(params: &HashMap<String, String>) -> StintResult<Self> {
        Ok(Self {
            game_id: scope_id(params, "game_id")?,
            team_id: scope_id(params, "team_id")?,
            player_id: scope_id(params, "player_id")?,
        })
    }

    pub fn matches(&self, interval: &LineupInterval) -> bool {
        self.game_id.map_or(true, |id| id == interval.game_id)
            && self.team_id.map_or(true, |id| id == interval.team_id)
            && self.player_id.map_or(true, |id| id == interval.player_id)
    }
}

fn scope_id(params: &HashMap<String, String>, name: &str) -> StintResult<Option<i64>> {
    params
        .get(name)
        .map(|raw| {
            raw.trim().parse().map_err(|_| {
                StintError::validation(format!("{} '{}' is not an integer id", name, raw))
            })
        })
        .transpose()
}

/// Read access to raw lineup intervals and the dimension tables
pub trait LineupSource {
    /// Every interval matching `scope`, in no guaranteed order
    fn intervals(&self, scope: &StintScope) -> StintResult<Vec<LineupInterval>>;

    /// Intervals for the first `key_limit` distinct `(game_id, team_id, lineup_num)`
    /// keys strictly after `after`
    fn wide_lineup_intervals(
        &self,
        after: Option<&WideLineupCursor>,
        key_limit: usize,
    ) -> StintResult<Vec<LineupInterval>>;

    /// Snapshot of teams, players, games and roster positions
    fn dimensions(&self) -> StintResult<Dimensions>;
}
