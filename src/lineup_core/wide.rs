//! Wide lineup assembly: five per-player rows folded into one record
//!
//! Rows sharing `(game_id, team_id, lineup_num, period, time_in, time_out)`
//! are one lineup instant. Players are placed into slots 1-5 by position
//! rank (PG, SG, SF, PF, C, other) with `player_id` breaking ties.

use super::clock::GameClock;
use super::dimensions::{DimensionLookup, Position};
use super::interval::LineupInterval;
use super::pagination::{Keyed, WideLineupCursor};
use crate::error::{StintError, StintResult};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Reverse;
use std::collections::BTreeMap;

pub const LINEUP_SLOTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineupSlot {
    pub player_id: i64,
    pub player_name: String,
    pub position: Position,
}

/// All on-court players for one team at one lineup instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideLineup {
    pub game_id: i64,
    pub team_id: i64,
    pub lineup_num: i32,
    pub period: i32,
    pub time_in: GameClock,
    pub time_out: GameClock,
    /// Filled front to back; trailing `None` when roster data is missing
    pub slots: [Option<LineupSlot>; LINEUP_SLOTS],
}

impl WideLineup {
    pub fn player_ids(&self) -> Vec<i64> {
        self.slots.iter().flatten().map(|s| s.player_id).collect()
    }

    pub fn filled_slots(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

impl Keyed for WideLineup {
    type Cursor = WideLineupCursor;

    fn cursor(&self) -> WideLineupCursor {
        WideLineupCursor {
            game_id: self.game_id,
            team_id: self.team_id,
            lineup_num: self.lineup_num,
        }
    }
}

// Flat `player1_id, player1_name, player1_position, ...` layout
impl Serialize for WideLineup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6 + LINEUP_SLOTS * 3))?;
        map.serialize_entry("game_id", &self.game_id)?;
        map.serialize_entry("team_id", &self.team_id)?;
        map.serialize_entry("lineup_num", &self.lineup_num)?;
        map.serialize_entry("period", &self.period)?;
        map.serialize_entry("time_in", &self.time_in)?;
        map.serialize_entry("time_out", &self.time_out)?;
        for (idx, slot) in self.slots.iter().enumerate() {
            let n = idx + 1;
            map.serialize_entry(&format!("player{}_id", n), &slot.as_ref().map(|s| s.player_id))?;
            map.serialize_entry(
                &format!("player{}_name", n),
                &slot.as_ref().map(|s| s.player_name.as_str()),
            )?;
            map.serialize_entry(
                &format!("player{}_position", n),
                &slot.as_ref().map(|s| s.position.as_str()),
            )?;
        }
        map.end()
    }
}

/// Grouping key; clocks reversed so a lineup's instants run in game order
type LineupInstant = (i64, i64, i32, i32, Reverse<GameClock>, Reverse<GameClock>);

fn instant_of(interval: &LineupInterval) -> LineupInstant {
    (
        interval.game_id,
        interval.team_id,
        interval.lineup_num,
        interval.period,
        Reverse(interval.time_in),
        Reverse(interval.time_out),
    )
}

pub struct WideLineupAssembler<'a, L: DimensionLookup> {
    lookup: &'a L,
}

impl<'a, L: DimensionLookup> WideLineupAssembler<'a, L> {
    pub fn new(lookup: &'a L) -> Self {
        Self { lookup }
    }

    /// Assemble every lineup instant present in `intervals`
    ///
    /// Output is ordered by `(game_id, team_id, lineup_num)`, then period and
    /// clock. Players without a roster position or name are left out (their
    /// slots stay empty); more than five players on one instant is an error.
    pub fn assemble(&self, intervals: &[LineupInterval]) -> StintResult<Vec<WideLineup>> {
        let mut groups: BTreeMap<LineupInstant, Vec<&LineupInterval>> = BTreeMap::new();
        for interval in intervals {
            interval.validate()?;
            groups.entry(instant_of(interval)).or_default().push(interval);
        }

        let mut lineups = Vec::with_capacity(groups.len());
        for (_, members) in groups {
            lineups.push(self.assemble_instant(&members)?);
        }

        log::debug!(
            "🏀 Assembled {} wide lineups from {} intervals",
            lineups.len(),
            intervals.len()
        );

        Ok(lineups)
    }

    fn assemble_instant(&self, members: &[&LineupInterval]) -> StintResult<WideLineup> {
        let first = members[0];

        if members.len() > LINEUP_SLOTS {
            return Err(StintError::data_integrity(format!(
                "{} players share lineup {} for team {} in game {} (period {}, {} -> {})",
                members.len(),
                first.lineup_num,
                first.team_id,
                first.game_id,
                first.period,
                first.time_in.to_clock_string(),
                first.time_out.to_clock_string(),
            )));
        }

        let mut players: Vec<LineupSlot> = members
            .iter()
            .filter_map(|m| self.slot_for(m))
            .collect();
        players.sort_by_key(|s| (s.position.rank(), s.player_id));

        let mut slots: [Option<LineupSlot>; LINEUP_SLOTS] = Default::default();
        for (slot, player) in slots.iter_mut().zip(players) {
            *slot = Some(player);
        }

        Ok(WideLineup {
            game_id: first.game_id,
            team_id: first.team_id,
            lineup_num: first.lineup_num,
            period: first.period,
            time_in: first.time_in,
            time_out: first.time_out,
            slots,
        })
    }

    fn slot_for(&self, interval: &LineupInterval) -> Option<LineupSlot> {
        let position = self.lookup.position(interval.player_id, interval.team_id);
        let name = self.lookup.player_name(interval.player_id);
        match (position, name) {
            (Some(position), Some(player_name)) => Some(LineupSlot {
                player_id: interval.player_id,
                player_name,
                position: position.clone(),
            }),
            _ => {
                log::warn!(
                    "⚠️  No roster entry for player {} on team {}; slot left empty",
                    interval.player_id,
                    interval.team_id
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineup_core::dimensions::{Dimensions, Player};
    use rand::seq::SliceRandom;

    const TEAM: i64 = 10;

    fn dims_with(players: &[(i64, &str)]) -> Dimensions {
        let mut dims = Dimensions::new();
        for (id, pos) in players {
            dims.add_player(Player {
                player_id: *id,
                first_name: "Player".to_string(),
                last_name: id.to_string(),
            });
            dims.add_roster_entry(*id, TEAM, Position::parse(pos));
        }
        dims
    }

    fn row(player_id: i64, lineup_num: i32, time_in: f64, time_out: f64) -> LineupInterval {
        LineupInterval {
            game_id: 1,
            team_id: TEAM,
            player_id,
            period: 1,
            lineup_num,
            time_in: GameClock::from_seconds(time_in),
            time_out: GameClock::from_seconds(time_out),
        }
    }

    fn positions(lineup: &WideLineup) -> Vec<&str> {
        lineup.slots.iter().flatten().map(|s| s.position.as_str()).collect()
    }

    #[test]
    fn test_slots_follow_position_rank_regardless_of_input_order() {
        let dims = dims_with(&[(1, "SG"), (2, "PG"), (3, "C"), (4, "PF"), (5, "SF")]);
        let mut rows: Vec<LineupInterval> = (1..=5).map(|id| row(id, 1, 720.0, 600.0)).collect();

        let assembler = WideLineupAssembler::new(&dims);
        let mut rng = rand::thread_rng();
        for _ in 0..10 {
            rows.shuffle(&mut rng);
            let lineups = assembler.assemble(&rows).unwrap();
            assert_eq!(lineups.len(), 1);
            assert_eq!(positions(&lineups[0]), vec!["PG", "SG", "SF", "PF", "C"]);
            assert_eq!(lineups[0].player_ids(), vec![2, 1, 5, 4, 3]);
        }
    }

    #[test]
    fn test_shared_position_breaks_tie_on_player_id() {
        let dims = dims_with(&[(9, "C"), (4, "C"), (1, "PG"), (2, "SG"), (3, "F")]);
        let rows: Vec<LineupInterval> = [9, 4, 1, 2, 3]
            .iter()
            .map(|id| row(*id, 1, 720.0, 600.0))
            .collect();

        let lineups = WideLineupAssembler::new(&dims).assemble(&rows).unwrap();
        assert_eq!(lineups[0].player_ids(), vec![1, 2, 4, 9, 3]);
        assert_eq!(positions(&lineups[0]), vec!["PG", "SG", "C", "C", "F"]);
    }

    #[test]
    fn test_missing_roster_leaves_trailing_slots_empty() {
        let dims = dims_with(&[(1, "PG"), (2, "SG"), (3, "SF")]);
        let rows: Vec<LineupInterval> = (1..=5).map(|id| row(id, 1, 720.0, 600.0)).collect();

        let lineups = WideLineupAssembler::new(&dims).assemble(&rows).unwrap();
        assert_eq!(lineups[0].filled_slots(), 3);
        assert!(lineups[0].slots[3].is_none());
        assert!(lineups[0].slots[4].is_none());
    }

    #[test]
    fn test_six_players_is_integrity_error() {
        let dims = dims_with(&[(1, "PG"), (2, "SG"), (3, "SF"), (4, "PF"), (5, "C"), (6, "C")]);
        let rows: Vec<LineupInterval> = (1..=6).map(|id| row(id, 1, 720.0, 600.0)).collect();

        let err = WideLineupAssembler::new(&dims).assemble(&rows).unwrap_err();
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_instants_are_separate_rows_in_key_order() {
        let dims = dims_with(&[(1, "PG"), (2, "SG")]);
        let rows = vec![
            row(1, 2, 500.0, 400.0),
            row(1, 1, 600.0, 500.0),
            row(2, 1, 720.0, 600.0),
            row(1, 1, 720.0, 600.0),
        ];

        let lineups = WideLineupAssembler::new(&dims).assemble(&rows).unwrap();
        let keys: Vec<(i32, f64)> = lineups
            .iter()
            .map(|l| (l.lineup_num, l.time_in.as_seconds()))
            .collect();
        assert_eq!(keys, vec![(1, 720.0), (1, 600.0), (2, 500.0)]);
        assert_eq!(lineups[0].filled_slots(), 2);
    }

    #[test]
    fn test_serializes_flat_player_columns() {
        let dims = dims_with(&[(1, "PG")]);
        let lineups = WideLineupAssembler::new(&dims)
            .assemble(&[row(1, 3, 720.0, 600.0)])
            .unwrap();

        let json = serde_json::to_value(&lineups[0]).unwrap();
        assert_eq!(json["lineup_num"], 3);
        assert_eq!(json["time_in"], 720.0);
        assert_eq!(json["player1_id"], 1);
        assert_eq!(json["player1_name"], "Player 1");
        assert_eq!(json["player1_position"], "PG");
        assert!(json["player2_id"].is_null());
        assert!(json["player5_position"].is_null());
    }

    #[test]
    fn test_reversed_clock_rejected() {
        let dims = dims_with(&[(1, "PG")]);
        let err = WideLineupAssembler::new(&dims)
            .assemble(&[row(1, 1, 500.0, 600.0)])
            .unwrap_err();
        assert!(err.is_validation());
    }
}
