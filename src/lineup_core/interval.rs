//! Raw lineup interval rows as supplied by the store

use super::clock::GameClock;
use crate::error::{StintError, StintResult};
use serde::{Deserialize, Serialize};

/// One player's on-court interval within a lineup, immutable once recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupInterval {
    pub game_id: i64,
    pub team_id: i64,
    pub player_id: i64,
    pub period: i32,
    pub lineup_num: i32,
    pub time_in: GameClock,
    pub time_out: GameClock,
}

impl LineupInterval {
    /// Reject rows the engine cannot reason about
    ///
    /// `time_out > time_in` would yield a negative duration on a countdown
    /// clock; a period below 1 does not exist.
    pub fn validate(&self) -> StintResult<()> {
        if self.time_out > self.time_in {
            return Err(StintError::validation(format!(
                "interval for player {} in game {} period {} has time_out {} after time_in {}",
                self.player_id,
                self.game_id,
                self.period,
                self.time_out.as_seconds(),
                self.time_in.as_seconds(),
            )));
        }
        if self.time_out < GameClock::ZERO {
            return Err(StintError::validation(format!(
                "interval for player {} in game {} has negative time_out {}",
                self.player_id,
                self.game_id,
                self.time_out.as_seconds(),
            )));
        }
        if self.period < 1 {
            return Err(StintError::data_integrity(format!(
                "interval for player {} in game {} has undefined period {}",
                self.player_id, self.game_id, self.period
            )));
        }
        Ok(())
    }

    pub fn duration(&self) -> GameClock {
        self.time_in - self.time_out
    }
}
