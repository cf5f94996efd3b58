//! Stint derivation: contiguous on-court runs from raw lineup intervals
//!
//! Intervals are grouped by a configurable partition key, ordered by
//! `(period ASC, time_in DESC)` and folded left to right. A new stint opens
//! whenever the partition starts, the period advances, or the interval's
//! `time_in` falls below the previous interval's `time_out` (the player sat
//! out in between). `time_in == prev_time_out` counts as continuous.

use super::clock::GameClock;
use super::interval::LineupInterval;
use crate::error::StintResult;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Whether stints are kept apart per team
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamScope {
    /// Partition includes `team_id`
    Scoped,
    /// Partition ignores `team_id` (mid-season trades are irrelevant)
    Agnostic,
}

/// Whether stint numbering restarts every period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodScope {
    /// Partition includes `period`; numbering restarts at 1 each period
    PerPeriod,
    /// One partition per game; numbering runs across periods
    WholeGame,
}

/// Partition definition used by a derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StintPartition {
    pub team: TeamScope,
    pub period: PeriodScope,
}

impl StintPartition {
    pub const fn new(team: TeamScope, period: PeriodScope) -> Self {
        Self { team, period }
    }

    /// `(game_id, team_id, player_id)`: player listings and wide contexts
    pub const fn team_game() -> Self {
        Self::new(TeamScope::Scoped, PeriodScope::WholeGame)
    }

    /// `(game_id, team_id, player_id, period)`: win/loss splits
    pub const fn team_period() -> Self {
        Self::new(TeamScope::Scoped, PeriodScope::PerPeriod)
    }

    /// `(game_id, player_id, period)`: season averages
    pub const fn player_period() -> Self {
        Self::new(TeamScope::Agnostic, PeriodScope::PerPeriod)
    }

    fn key_for(&self, interval: &LineupInterval) -> PartitionKey {
        PartitionKey {
            game_id: interval.game_id,
            player_id: interval.player_id,
            team_id: match self.team {
                TeamScope::Scoped => Some(interval.team_id),
                TeamScope::Agnostic => None,
            },
            period: match self.period {
                PeriodScope::PerPeriod => Some(interval.period),
                PeriodScope::WholeGame => None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionKey {
    pub game_id: i64,
    pub player_id: i64,
    pub team_id: Option<i64>,
    pub period: Option<i32>,
}

/// A maximal clock-contiguous run of intervals for one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stint {
    pub game_id: i64,
    pub team_id: i64,
    pub player_id: i64,
    pub period: i32,
    pub stint_number: u32,
    pub stint_start: GameClock,
    pub stint_end: GameClock,
}

impl Stint {
    /// Time on court; never negative for validated input
    pub fn duration(&self) -> GameClock {
        self.stint_start - self.stint_end
    }
}

/// Running state of the fold over one sorted partition
struct StintFold {
    stints: Vec<Stint>,
    prev_time_out: Option<GameClock>,
    prev_period: Option<i32>,
    stint_number: u32,
}

impl StintFold {
    fn new() -> Self {
        Self {
            stints: Vec::new(),
            prev_time_out: None,
            prev_period: None,
            stint_number: 0,
        }
    }

    fn opens_new_stint(&self, interval: &LineupInterval) -> bool {
        match (self.prev_time_out, self.prev_period) {
            (Some(prev_out), Some(prev_period)) => {
                interval.time_in < prev_out || interval.period > prev_period
            }
            _ => true,
        }
    }

    fn push(&mut self, interval: &LineupInterval) {
        if self.opens_new_stint(interval) {
            self.stint_number += 1;
            self.stints.push(Stint {
                game_id: interval.game_id,
                team_id: interval.team_id,
                player_id: interval.player_id,
                period: interval.period,
                stint_number: self.stint_number,
                stint_start: interval.time_in,
                stint_end: interval.time_out,
            });
        } else if let Some(current) = self.stints.last_mut() {
            current.stint_start = current.stint_start.max(interval.time_in);
            current.stint_end = current.stint_end.min(interval.time_out);
        }

        self.prev_time_out = Some(interval.time_out);
        self.prev_period = Some(interval.period);
    }

    fn finish(self) -> Vec<Stint> {
        self.stints
    }
}

/// Derives stints for every partition found in a set of raw intervals
#[derive(Debug, Clone, Copy)]
pub struct StintDeriver {
    partition: StintPartition,
}

impl StintDeriver {
    pub fn new(partition: StintPartition) -> Self {
        Self { partition }
    }

    /// Derive stints from an unordered set of intervals
    ///
    /// Every interval is validated before any stint is produced. Output is
    /// ordered by partition key, then `(period, stint_start DESC)`.
    pub fn derive(&self, intervals: &[LineupInterval]) -> StintResult<Vec<Stint>> {
        for interval in intervals {
            interval.validate()?;
        }

        let partitions = self.group(intervals);
        let partition_count = partitions.len();

        let stints: Vec<Stint> = partitions
            .into_values()
            .flat_map(derive_partition)
            .collect();

        log::debug!(
            "🧮 Derived {} stints from {} intervals across {} partitions ({:?})",
            stints.len(),
            intervals.len(),
            partition_count,
            self.partition
        );

        Ok(stints)
    }

    fn group<'a>(
        &self,
        intervals: &'a [LineupInterval],
    ) -> BTreeMap<PartitionKey, Vec<&'a LineupInterval>> {
        let mut partitions: BTreeMap<PartitionKey, Vec<&LineupInterval>> = BTreeMap::new();
        for interval in intervals {
            partitions
                .entry(self.partition.key_for(interval))
                .or_default()
                .push(interval);
        }
        partitions
    }
}

/// Fold one partition's intervals into stints
fn derive_partition(mut intervals: Vec<&LineupInterval>) -> Vec<Stint> {
    // time_out DESC and lineup_num break ties so equal time_in rows fold the
    // same way regardless of input order
    intervals.sort_by_key(|i| {
        (
            i.period,
            Reverse(i.time_in),
            Reverse(i.time_out),
            i.lineup_num,
            i.team_id,
        )
    });

    let mut fold = StintFold::new();
    for interval in intervals {
        fold.push(interval);
    }
    fold.finish()
}
