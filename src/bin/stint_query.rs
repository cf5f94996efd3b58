//! Stint Query - paginated stint reports as JSON
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin stint_query -- <query> [key=value ...]
//! ```
//!
//! Queries: `wide-lineups`, `player-stints`, `stint-averages`, `win-loss-stints`.
//! Parameters: `page_size`, the `last_*` cursor fields printed in a previous
//! response's `next_cursor`, and the scope filters `game_id`, `team_id`,
//! `player_id`.
//!
//! ## Environment Variables
//!
//! - STINTFLOW_DB_PATH - SQLite database path (default: data/stintflow.db)
//! - DEFAULT_PAGE_SIZE - Page size when none is given (default: 50, max 100)
//! - SQLITE_BUSY_TIMEOUT_MS - Wait on a locked database (default: 5000)
//! - RUST_LOG - Logging level (optional, default: info)

use std::collections::HashMap;
use std::env;
use stintflow::config::QueryConfig;
use stintflow::service::{QueryKind, StintQueryEngine};
use stintflow::store::SqliteLineupStore;

const USAGE: &str = "usage: stint_query \
    <wide-lineups|player-stints|stint-averages|win-loss-stints> [key=value ...]";

fn parse_params(args: &[String]) -> Result<HashMap<String, String>, Box<dyn std::error::Error>> {
    let mut params = HashMap::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{}'", arg))?;
        params.insert(key.to_string(), value.to_string());
    }
    Ok(params)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some((query, rest)) = args.split_first() else {
        return Err(USAGE.into());
    };
    let kind = QueryKind::parse(query)?;
    let params = parse_params(rest)?;

    let config = QueryConfig::from_env();

    log::info!("🚀 Starting stint query: {}", query);
    log::info!("   Database: {}", config.db_path);
    log::info!("   Default page size: {}", config.default_page_size);

    let store = SqliteLineupStore::open(&config.db_path, config.busy_timeout())?;
    let engine = StintQueryEngine::new(store, config.default_page_size);

    let body = engine.handle(kind, &params)?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}
