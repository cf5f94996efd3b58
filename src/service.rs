//! Query engine: one entry point per paginated report
//!
//! Each call reads a fresh snapshot from the [`LineupSource`], derives what it
//! needs and returns one keyset page. Nothing is cached between calls.

use crate::error::{StintError, StintResult};
use crate::lineup_core::aggregate::{StintAggregator, StintAverageRow, WinLossStintRow};
use crate::lineup_core::dimensions::DimensionLookup;
use crate::lineup_core::pagination::{
    paginate, Keyed, Page, PageRequest, PlayerNameCursor, PlayerStintCursor, WideLineupCursor,
};
use crate::lineup_core::stint::{Stint, StintDeriver, StintPartition};
use crate::lineup_core::wide::{WideLineup, WideLineupAssembler};
use crate::store::{LineupSource, StintScope};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;

/// One stint in the player stints listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStintRow {
    pub game_id: i64,
    pub game_date: NaiveDateTime,
    pub team: String,
    pub opponent: String,
    pub player_name: String,
    pub period: i32,
    pub stint_number: u32,
    /// `M:SS` clock reading
    pub stint_start_time: String,
    pub stint_end_time: String,
}

impl PlayerStintRow {
    /// `None` when any dimension the row needs is missing
    pub fn resolve<L: DimensionLookup>(stint: &Stint, lookup: &L) -> Option<Self> {
        let game = lookup.game(stint.game_id)?;
        let team = lookup.team_name(stint.team_id)?;
        let opponent = lookup.team_name(game.opponent_of(stint.team_id))?;
        let player_name = lookup.player_name(stint.player_id)?;

        Some(Self {
            game_id: stint.game_id,
            game_date: game.game_date,
            team: team.to_string(),
            opponent: opponent.to_string(),
            player_name,
            period: stint.period,
            stint_number: stint.stint_number,
            stint_start_time: stint.stint_start.to_clock_string(),
            stint_end_time: stint.stint_end.to_clock_string(),
        })
    }
}

impl Keyed for PlayerStintRow {
    type Cursor = PlayerStintCursor;

    fn cursor(&self) -> PlayerStintCursor {
        PlayerStintCursor {
            game_date: self.game_date,
            team_name: self.team.clone(),
            player_name: self.player_name.clone(),
            period: self.period,
            stint_number: self.stint_number,
        }
    }
}

/// The four paginated reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    WideLineups,
    PlayerStints,
    StintAverages,
    WinLossStints,
}

impl QueryKind {
    pub fn parse(name: &str) -> StintResult<Self> {
        match name {
            "wide-lineups" => Ok(QueryKind::WideLineups),
            "player-stints" => Ok(QueryKind::PlayerStints),
            "stint-averages" => Ok(QueryKind::StintAverages),
            "win-loss-stints" => Ok(QueryKind::WinLossStints),
            other => Err(StintError::validation(format!("unknown query '{}'", other))),
        }
    }

    /// Key the rows are listed under in the response body
    pub fn result_key(&self) -> &'static str {
        match self {
            QueryKind::WideLineups => "lineups",
            QueryKind::PlayerStints => "stints",
            QueryKind::StintAverages => "stint_averages",
            QueryKind::WinLossStints => "win_loss_stints",
        }
    }
}

pub struct StintQueryEngine<S: LineupSource> {
    source: S,
    default_page_size: usize,
}

impl<S: LineupSource> StintQueryEngine<S> {
    pub fn new(source: S, default_page_size: usize) -> Self {
        Self {
            source,
            default_page_size,
        }
    }

    /// Parse request parameters, run the report and build the JSON body
    pub fn handle(
        &self,
        kind: QueryKind,
        params: &HashMap<String, String>,
    ) -> StintResult<serde_json::Value> {
        let body = match kind {
            QueryKind::WideLineups => {
                let request = PageRequest::from_params(params, self.default_page_size)?;
                self.wide_lineups(&request)?.to_response(kind.result_key())?
            }
            QueryKind::PlayerStints => {
                let scope = StintScope::from_params(params)?;
                let request = PageRequest::from_params(params, self.default_page_size)?;
                self.player_stints(&scope, &request)?.to_response(kind.result_key())?
            }
            QueryKind::StintAverages => {
                let scope = StintScope::from_params(params)?;
                let request = PageRequest::from_params(params, self.default_page_size)?;
                self.stint_averages(&scope, &request)?.to_response(kind.result_key())?
            }
            QueryKind::WinLossStints => {
                let scope = StintScope::from_params(params)?;
                let request = PageRequest::from_params(params, self.default_page_size)?;
                self.win_loss_stints(&scope, &request)?.to_response(kind.result_key())?
            }
        };
        Ok(body)
    }

    /// Wide lineups ordered by `(game_id, team_id, lineup_num)`
    ///
    /// The store is asked for exactly `page_size` distinct lineup keys, so
    /// one page never reads the whole lineup table.
    pub fn wide_lineups(
        &self,
        request: &PageRequest<WideLineupCursor>,
    ) -> StintResult<Page<WideLineup>> {
        let intervals = self
            .source
            .wide_lineup_intervals(request.cursor.as_ref(), request.page_size.get())?;
        let dims = self.source.dimensions()?;
        let lineups = WideLineupAssembler::new(&dims).assemble(&intervals)?;

        let page = paginate(lineups, request.cursor.as_ref(), request.page_size);
        log_page("wide lineups", intervals.len(), &page);
        Ok(page)
    }

    /// Every stint, numbered across the whole game per player and team
    pub fn player_stints(
        &self,
        scope: &StintScope,
        request: &PageRequest<PlayerStintCursor>,
    ) -> StintResult<Page<PlayerStintRow>> {
        let intervals = self.source.intervals(scope)?;
        let stints = StintDeriver::new(StintPartition::team_game()).derive(&intervals)?;
        let dims = self.source.dimensions()?;

        let rows: Vec<PlayerStintRow> = stints
            .iter()
            .filter_map(|stint| PlayerStintRow::resolve(stint, &dims))
            .collect();
        warn_dropped("player stints", stints.len(), rows.len());

        let page = paginate(rows, request.cursor.as_ref(), request.page_size);
        log_page("player stints", intervals.len(), &page);
        Ok(page)
    }

    /// Average stints per game and average stint length per player
    pub fn stint_averages(
        &self,
        scope: &StintScope,
        request: &PageRequest<PlayerNameCursor>,
    ) -> StintResult<Page<StintAverageRow>> {
        let intervals = self.source.intervals(scope)?;
        let stints = StintDeriver::new(StintPartition::player_period()).derive(&intervals)?;
        let dims = self.source.dimensions()?;

        let summaries = StintAggregator::new().summarize(&stints);
        let rows: Vec<StintAverageRow> = summaries
            .iter()
            .filter_map(|s| {
                dims.player_name(s.player_id)
                    .map(|name| StintAverageRow::from_summary(s, name))
            })
            .collect();
        warn_dropped("stint averages", summaries.len(), rows.len());

        let page = paginate(rows, request.cursor.as_ref(), request.page_size);
        log_page("stint averages", intervals.len(), &page);
        Ok(page)
    }

    /// Stint averages split by game outcome, with win minus loss differences
    pub fn win_loss_stints(
        &self,
        scope: &StintScope,
        request: &PageRequest<PlayerNameCursor>,
    ) -> StintResult<Page<WinLossStintRow>> {
        let intervals = self.source.intervals(scope)?;
        let stints = StintDeriver::new(StintPartition::team_period()).derive(&intervals)?;
        let dims = self.source.dimensions()?;

        let summaries = StintAggregator::new().summarize_by_outcome(&stints, &dims);
        let rows: Vec<WinLossStintRow> = summaries
            .iter()
            .filter_map(|s| {
                dims.player_name(s.player_id)
                    .map(|name| WinLossStintRow::from_summary(s, name))
            })
            .collect();
        warn_dropped("win/loss stints", summaries.len(), rows.len());

        let page = paginate(rows, request.cursor.as_ref(), request.page_size);
        log_page("win/loss stints", intervals.len(), &page);
        Ok(page)
    }
}

fn warn_dropped(report: &str, derived: usize, kept: usize) {
    if kept < derived {
        log::warn!(
            "⚠️  {}: dropped {} rows with missing team, player or game data",
            report,
            derived - kept
        );
    }
}

fn log_page<T: Keyed>(report: &str, intervals: usize, page: &Page<T>) {
    log::info!(
        "📤 {}: {} rows from {} intervals (page_size={}, more={})",
        report,
        page.items.len(),
        intervals,
        page.pagination.page_size,
        page.pagination.next_cursor.is_some()
    );
}
