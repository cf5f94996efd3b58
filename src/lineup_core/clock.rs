//! Countdown clock values and `minutes:seconds` formatting
//!
//! The store records clock readings as decimal seconds with one fractional
//! digit. Internally everything is kept as whole tenths of a second so that
//! adjacency checks (`time_in == prev_time_out`) are exact.

use crate::error::{StintError, StintResult};
use serde::{Deserialize, Serialize};

/// Time remaining in a period (or a span of it), in tenths of a second
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct GameClock(i64);

impl GameClock {
    pub const ZERO: GameClock = GameClock(0);

    pub fn from_tenths(tenths: i64) -> Self {
        GameClock(tenths)
    }

    pub fn from_seconds(seconds: f64) -> Self {
        GameClock((seconds * 10.0).round() as i64)
    }

    pub fn tenths(&self) -> i64 {
        self.0
    }

    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 10.0
    }

    /// Clock reading as shown on a scoreboard: `12:00`, `4:05`
    pub fn to_clock_string(&self) -> String {
        let whole_secs = self.0.div_euclid(10);
        format!("{}:{:02}", whole_secs / 60, whole_secs % 60)
    }
}

impl From<f64> for GameClock {
    fn from(seconds: f64) -> Self {
        GameClock::from_seconds(seconds)
    }
}

impl From<GameClock> for f64 {
    fn from(clock: GameClock) -> Self {
        clock.as_seconds()
    }
}

impl std::ops::Sub for GameClock {
    type Output = GameClock;

    fn sub(self, rhs: GameClock) -> GameClock {
        GameClock(self.0 - rhs.0)
    }
}

impl std::ops::Add for GameClock {
    type Output = GameClock;

    fn add(self, rhs: GameClock) -> GameClock {
        GameClock(self.0 + rhs.0)
    }
}

impl std::iter::Sum for GameClock {
    fn sum<I: Iterator<Item = GameClock>>(iter: I) -> Self {
        iter.fold(GameClock::ZERO, |acc, c| acc + c)
    }
}

/// Format a duration in seconds as `MM:SS`, truncating fractional seconds
pub fn format_duration(seconds: f64) -> String {
    let sign = if seconds < 0.0 { "-" } else { "" };
    let whole = seconds.abs().trunc() as i64;
    format!("{}{:02}:{:02}", sign, whole / 60, whole % 60)
}

/// Signed difference of two average durations
///
/// Any result where `subtrahend` is the larger value gets a leading `-`,
/// including gaps under a second (`-00:00`). Equal values print `00:00`.
pub fn format_signed_difference(minuend: f64, subtrahend: f64) -> String {
    let magnitude = format_duration((minuend - subtrahend).abs());
    if minuend < subtrahend {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

/// Parse `M:SS` / `MM:SS` (optionally prefixed with `-`) back into seconds
pub fn parse_duration(text: &str) -> StintResult<f64> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (minutes, seconds) = body
        .split_once(':')
        .ok_or_else(|| StintError::validation(format!("duration '{}' is not MM:SS", text)))?;

    let minutes: u32 = minutes
        .parse()
        .map_err(|_| StintError::validation(format!("bad minutes in duration '{}'", text)))?;
    let seconds: u32 = seconds
        .parse()
        .map_err(|_| StintError::validation(format!("bad seconds in duration '{}'", text)))?;

    if seconds >= 60 {
        return Err(StintError::validation(format!(
            "seconds out of range in duration '{}'",
            text
        )));
    }

    let total = f64::from(minutes * 60 + seconds);
    Ok(if negative { -total } else { total })
}
