//! Lineup Core - Stint Derivation and Aggregation Engine
//!
//! Turns raw countdown-clock lineup intervals into player stints, wide
//! five-slot lineups and per-player stint statistics, and cuts every result
//! set into keyset pages.
//!
//! # Architecture
//!
//! ```text
//! LineupSource (SQLite) → LineupInterval rows + Dimensions
//!     ↓
//! StintDeriver (sorted fold per StintPartition)
//!     ↓                                   ↘
//! StintAggregator (averages, win/loss)    WideLineupAssembler (slots 1-5)
//!     ↓                                   ↙
//! paginate (typed keyset cursors) → JSON page
//! ```

pub mod aggregate;
pub mod clock;
pub mod dimensions;
pub mod interval;
pub mod pagination;
pub mod stint;
pub mod wide;

pub use aggregate::{
    PlayerStintSummary, StintAggregator, StintAverageRow, StintTotals, WinLossStintRow,
};
pub use clock::{format_duration, format_signed_difference, parse_duration, GameClock};
pub use dimensions::{DimensionLookup, Dimensions, GameOutcome, GameResult, Player, Position};
pub use interval::LineupInterval;
pub use pagination::{
    paginate, CursorParams, Keyed, Page, PageRequest, PageSize, PaginationInfo, PlayerNameCursor,
    PlayerStintCursor, WideLineupCursor, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use stint::{PeriodScope, Stint, StintDeriver, StintPartition, TeamScope};
pub use wide::{LineupSlot, WideLineup, WideLineupAssembler, LINEUP_SLOTS};
