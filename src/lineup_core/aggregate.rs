//! Per-player stint aggregates: counts, averages and win/loss splits
//!
//! Ratios with a zero denominator are `None` ("no data"), which serializes
//! as `null` and stays distinguishable from a real `0`.

use super::clock::{format_duration, format_signed_difference, GameClock};
use super::dimensions::{DimensionLookup, GameOutcome};
use super::pagination::{Keyed, PlayerNameCursor};
use super::stint::Stint;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Totals over one set of stints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StintTotals {
    games: HashSet<i64>,
    pub total_stints: u32,
    pub total_stint_duration: GameClock,
}

impl StintTotals {
    pub fn record(&mut self, stint: &Stint) {
        self.games.insert(stint.game_id);
        self.total_stints += 1;
        self.total_stint_duration = self.total_stint_duration + stint.duration();
    }

    /// Distinct games with at least one stint
    pub fn total_games(&self) -> u32 {
        self.games.len() as u32
    }

    pub fn avg_stints_per_game(&self) -> Option<f64> {
        ratio(self.total_stints as f64, self.total_games() as f64)
    }

    /// Average stint length in seconds
    pub fn avg_stint_seconds(&self) -> Option<f64> {
        ratio(self.total_stint_duration.as_seconds(), self.total_stints as f64)
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-player totals, optionally split by game outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStintSummary {
    pub player_id: i64,
    pub overall: StintTotals,
    pub wins: StintTotals,
    pub losses: StintTotals,
}

impl PlayerStintSummary {
    fn new(player_id: i64) -> Self {
        Self {
            player_id,
            overall: StintTotals::default(),
            wins: StintTotals::default(),
            losses: StintTotals::default(),
        }
    }
}

pub struct StintAggregator;

impl StintAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Totals per player, ordered by `player_id`
    pub fn summarize(&self, stints: &[Stint]) -> Vec<PlayerStintSummary> {
        let mut by_player: BTreeMap<i64, PlayerStintSummary> = BTreeMap::new();
        for stint in stints {
            by_player
                .entry(stint.player_id)
                .or_insert_with(|| PlayerStintSummary::new(stint.player_id))
                .overall
                .record(stint);
        }
        by_player.into_values().collect()
    }

    /// Totals per player with win/loss splits
    ///
    /// A stint's outcome is its team's result in that game. Stints whose game
    /// is unknown to `lookup` are skipped entirely.
    pub fn summarize_by_outcome<L: DimensionLookup>(
        &self,
        stints: &[Stint],
        lookup: &L,
    ) -> Vec<PlayerStintSummary> {
        let mut by_player: BTreeMap<i64, PlayerStintSummary> = BTreeMap::new();
        let mut skipped = 0usize;

        for stint in stints {
            let Some(game) = lookup.game(stint.game_id) else {
                skipped += 1;
                continue;
            };
            let summary = by_player
                .entry(stint.player_id)
                .or_insert_with(|| PlayerStintSummary::new(stint.player_id));

            summary.overall.record(stint);
            match game.outcome_for(stint.team_id) {
                GameOutcome::Win => summary.wins.record(stint),
                GameOutcome::Loss => summary.losses.record(stint),
            }
        }

        if skipped > 0 {
            log::warn!("⚠️  Skipped {} stints with no schedule row", skipped);
        }

        by_player.into_values().collect()
    }
}

impl Default for StintAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of the stint averages report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StintAverageRow {
    pub player_id: i64,
    pub player_name: String,
    pub total_games: u32,
    pub avg_stints_per_game: Option<f64>,
    pub avg_stint_length: Option<String>,
}

impl StintAverageRow {
    pub fn from_summary(summary: &PlayerStintSummary, player_name: String) -> Self {
        let totals = &summary.overall;
        Self {
            player_id: summary.player_id,
            player_name,
            total_games: totals.total_games(),
            avg_stints_per_game: totals.avg_stints_per_game().map(round2),
            avg_stint_length: totals.avg_stint_seconds().map(format_duration),
        }
    }
}

impl Keyed for StintAverageRow {
    type Cursor = PlayerNameCursor;

    fn cursor(&self) -> PlayerNameCursor {
        PlayerNameCursor {
            player_name: self.player_name.clone(),
        }
    }
}

/// One row of the win/loss stint report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinLossStintRow {
    pub player_id: i64,
    pub player_name: String,

    pub total_games: u32,
    pub avg_stints_per_game: Option<f64>,
    pub avg_stint_length: Option<String>,

    pub total_games_wins: u32,
    pub avg_stints_per_game_wins: Option<f64>,
    pub avg_stint_length_wins: Option<String>,

    pub total_games_losses: u32,
    pub avg_stints_per_game_losses: Option<f64>,
    pub avg_stint_length_losses: Option<String>,

    /// Wins minus losses
    pub avg_stints_per_game_diff: Option<f64>,
    pub avg_stint_length_diff: Option<String>,
}

impl WinLossStintRow {
    pub fn from_summary(summary: &PlayerStintSummary, player_name: String) -> Self {
        let (overall, wins, losses) = (&summary.overall, &summary.wins, &summary.losses);

        let stints_diff = match (wins.avg_stints_per_game(), losses.avg_stints_per_game()) {
            (Some(w), Some(l)) => Some(round2(w - l)),
            _ => None,
        };
        let length_diff = match (wins.avg_stint_seconds(), losses.avg_stint_seconds()) {
            (Some(w), Some(l)) => Some(format_signed_difference(w, l)),
            _ => None,
        };

        Self {
            player_id: summary.player_id,
            player_name,
            total_games: overall.total_games(),
            avg_stints_per_game: overall.avg_stints_per_game().map(round2),
            avg_stint_length: overall.avg_stint_seconds().map(format_duration),
            total_games_wins: wins.total_games(),
            avg_stints_per_game_wins: wins.avg_stints_per_game().map(round2),
            avg_stint_length_wins: wins.avg_stint_seconds().map(format_duration),
            total_games_losses: losses.total_games(),
            avg_stints_per_game_losses: losses.avg_stints_per_game().map(round2),
            avg_stint_length_losses: losses.avg_stint_seconds().map(format_duration),
            avg_stints_per_game_diff: stints_diff,
            avg_stint_length_diff: length_diff,
        }
    }
}

impl Keyed for WinLossStintRow {
    type Cursor = PlayerNameCursor;

    fn cursor(&self) -> PlayerNameCursor {
        PlayerNameCursor {
            player_name: self.player_name.clone(),
        }
    }
}
