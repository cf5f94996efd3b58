//! Keyset pagination over derived result sets
//!
//! Every paginated row type exposes its ordering key as a typed cursor
//! (`Keyed::Cursor`). A request carrying a cursor sees only rows whose key is
//! strictly greater, and every non-empty page hands back the last row's key
//! as `next_cursor`.
//!
//! Cursors travel as flat `last_*` request parameters. All fields of a cursor
//! must be present for it to apply; a partial cursor counts as none.

use crate::error::{StintError, StintResult};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 100;

/// Caller-supplied page size, clamped to `MAX_PAGE_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(usize);

impl PageSize {
    /// Clamp oversize requests; zero is a caller error
    pub fn new(requested: usize) -> StintResult<Self> {
        if requested == 0 {
            return Err(StintError::validation("page_size must be at least 1"));
        }
        Ok(PageSize(requested.min(MAX_PAGE_SIZE)))
    }

    pub fn parse(raw: Option<&str>, default: usize) -> StintResult<Self> {
        match raw {
            None => PageSize::new(default),
            Some(text) => {
                let requested: i64 = text.trim().parse().map_err(|_| {
                    StintError::validation(format!("page_size '{}' is not numeric", text))
                })?;
                if requested < 1 {
                    return Err(StintError::validation(format!(
                        "page_size must be at least 1, got {}",
                        requested
                    )));
                }
                PageSize::new(usize::try_from(requested).unwrap_or(usize::MAX))
            }
        }
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize(DEFAULT_PAGE_SIZE)
    }
}

/// A row with a total order usable as a keyset cursor
pub trait Keyed {
    type Cursor: Ord + Clone + Serialize + std::fmt::Debug;

    fn cursor(&self) -> Self::Cursor;
}

/// Cursor fields as request parameters
pub trait CursorParams: Sized {
    const FIELDS: &'static [&'static str];

    /// Build the cursor from already-present raw field values
    fn from_fields(fields: &HashMap<&str, &str>) -> StintResult<Self>;

    /// `Ok(None)` when any field is missing, an error when a field is malformed
    fn from_params(params: &HashMap<String, String>) -> StintResult<Option<Self>> {
        let mut fields = HashMap::new();
        for name in Self::FIELDS {
            match params.get(*name) {
                Some(value) => {
                    fields.insert(*name, value.as_str());
                }
                None => return Ok(None),
            }
        }
        Self::from_fields(&fields).map(Some)
    }
}

fn int_field<T: std::str::FromStr>(fields: &HashMap<&str, &str>, name: &str) -> StintResult<T> {
    let raw = fields.get(name).copied().unwrap_or_default();
    raw.trim().parse().map_err(|_| {
        StintError::validation(format!("cursor field {} has bad value '{}'", name, raw))
    })
}

fn text_field(fields: &HashMap<&str, &str>, name: &str) -> String {
    fields.get(name).copied().unwrap_or_default().to_string()
}

/// Accepts `2024-01-15T19:30:00`, `2024-01-15 19:30:00` or `2024-01-15`
pub fn parse_game_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// `(game_id, team_id, lineup_num)`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WideLineupCursor {
    #[serde(rename = "last_game_id")]
    pub game_id: i64,
    #[serde(rename = "last_team_id")]
    pub team_id: i64,
    #[serde(rename = "last_lineup_num")]
    pub lineup_num: i32,
}

impl CursorParams for WideLineupCursor {
    const FIELDS: &'static [&'static str] = &["last_game_id", "last_team_id", "last_lineup_num"];

    fn from_fields(fields: &HashMap<&str, &str>) -> StintResult<Self> {
        Ok(Self {
            game_id: int_field(fields, "last_game_id")?,
            team_id: int_field(fields, "last_team_id")?,
            lineup_num: int_field(fields, "last_lineup_num")?,
        })
    }
}

/// `(game_date, team_name, player_name, period, stint_number)`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerStintCursor {
    #[serde(rename = "last_game_date")]
    pub game_date: NaiveDateTime,
    #[serde(rename = "last_team_name")]
    pub team_name: String,
    #[serde(rename = "last_player_name")]
    pub player_name: String,
    #[serde(rename = "last_period")]
    pub period: i32,
    #[serde(rename = "last_stint_number")]
    pub stint_number: u32,
}

impl CursorParams for PlayerStintCursor {
    const FIELDS: &'static [&'static str] = &[
        "last_game_date",
        "last_team_name",
        "last_player_name",
        "last_period",
        "last_stint_number",
    ];

    fn from_fields(fields: &HashMap<&str, &str>) -> StintResult<Self> {
        let raw_date = fields.get("last_game_date").copied().unwrap_or_default();
        let game_date = parse_game_date(raw_date).ok_or_else(|| {
            StintError::validation(format!(
                "cursor field last_game_date has bad value '{}'",
                raw_date
            ))
        })?;

        Ok(Self {
            game_date,
            team_name: text_field(fields, "last_team_name"),
            player_name: text_field(fields, "last_player_name"),
            period: int_field(fields, "last_period")?,
            stint_number: int_field(fields, "last_stint_number")?,
        })
    }
}

/// `(player_name)`, shared by the averages and win/loss reports
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerNameCursor {
    #[serde(rename = "last_player_name")]
    pub player_name: String,
}

impl CursorParams for PlayerNameCursor {
    const FIELDS: &'static [&'static str] = &["last_player_name"];

    fn from_fields(fields: &HashMap<&str, &str>) -> StintResult<Self> {
        Ok(Self {
            player_name: text_field(fields, "last_player_name"),
        })
    }
}

/// Page size plus optional cursor, as parsed from request parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest<C> {
    pub page_size: PageSize,
    pub cursor: Option<C>,
}

impl<C> PageRequest<C> {
    pub fn first(page_size: PageSize) -> Self {
        Self { page_size, cursor: None }
    }

    pub fn after(page_size: PageSize, cursor: C) -> Self {
        Self {
            page_size,
            cursor: Some(cursor),
        }
    }
}

impl<C: CursorParams> PageRequest<C> {
    pub fn from_params(
        params: &HashMap<String, String>,
        default_page_size: usize,
    ) -> StintResult<Self> {
        let raw_size = params.get("page_size").map(String::as_str);
        Ok(Self {
            page_size: PageSize::parse(raw_size, default_page_size)?,
            cursor: C::from_params(params)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationInfo<C> {
    pub page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<C>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T: Keyed> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo<T::Cursor>,
}

impl<T: Keyed + Serialize> Page<T> {
    /// `{ <result_key>: [...], pagination: { page_size, next_cursor? } }`
    pub fn to_response(&self, result_key: &str) -> serde_json::Result<serde_json::Value> {
        let mut body = serde_json::Map::new();
        body.insert(result_key.to_string(), serde_json::to_value(&self.items)?);
        body.insert("pagination".to_string(), serde_json::to_value(&self.pagination)?);
        Ok(serde_json::Value::Object(body))
    }
}

/// Cut one page out of `rows`
///
/// Rows are stably sorted by cursor first, so callers may pass them in any
/// order; rows with equal keys keep their relative order. A page never ends
/// in the middle of a run of equal keys: it is trimmed back to before the
/// run, or extended over it when the run fills the whole page. Only that
/// extension can return more than `page_size` rows, even past `MAX_PAGE_SIZE`.
pub fn paginate<T: Keyed>(
    mut rows: Vec<T>,
    after: Option<&T::Cursor>,
    page_size: PageSize,
) -> Page<T> {
    rows.sort_by_cached_key(|r| r.cursor());

    let start = match after {
        Some(cursor) => rows.partition_point(|r| r.cursor() <= *cursor),
        None => 0,
    };
    let mut remaining = rows.split_off(start);

    let limit = page_size.get();
    if remaining.len() > limit {
        let last_key = remaining[limit - 1].cursor();
        let end = if remaining[limit].cursor() == last_key {
            let run_start = remaining[..limit].partition_point(|r| r.cursor() < last_key);
            if run_start > 0 {
                run_start
            } else {
                remaining.partition_point(|r| r.cursor() <= last_key)
            }
        } else {
            limit
        };
        remaining.truncate(end);
    }

    let next_cursor = remaining.last().map(Keyed::cursor);

    Page {
        items: remaining,
        pagination: PaginationInfo {
            page_size: limit,
            next_cursor,
        },
    }
}
