//! Integration tests for the stint query engine over a real SQLite file
//!
//! Key integration points tested:
//! - Keyset chains over the store visit every row exactly once
//! - Oversized page requests are clamped
//! - Rows appended after the cursor show up on the next call
//! - Cursors printed in a response work as the next request's parameters
//! - Win/loss splits computed end to end

#[cfg(test)]
mod query_pagination_tests {
    use rusqlite::{params, Connection};
    use serde_json::Value;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use stintflow::lineup_core::{PageRequest, PageSize, WideLineupCursor};
    use stintflow::service::{QueryKind, StintQueryEngine};
    use stintflow::store::{create_schema, SqliteLineupStore};
    use tempfile::TempDir;

    const CLIPPERS: i64 = 10;
    const SAMPLE: i64 = 30;
    const LINEUPS_IN_GAME_ONE: i32 = 130;

    #[allow(clippy::too_many_arguments)]
    fn insert_interval(
        conn: &Connection,
        game_id: i64,
        team_id: i64,
        player_id: i64,
        period: i32,
        lineup_num: i32,
        time_in: f64,
        time_out: f64,
    ) {
        conn.execute(
            "INSERT INTO lineup (team_id, player_id, game_id, lineup_num, period, time_in, time_out)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![team_id, player_id, game_id, lineup_num, period, time_in, time_out],
        )
        .unwrap();
    }

    fn setup_test_db() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("stints.db");
        let conn = Connection::open(&db_path).unwrap();
        create_schema(&conn).unwrap();

        conn.execute_batch(
            "INSERT INTO teams (team_id, team_name) VALUES
                 (10, 'LA Clippers'), (20, 'Denver Nuggets'), (30, 'Sample Team');
             INSERT INTO game_schedule
                 (game_id, home_id, away_id, home_score, away_score, game_date) VALUES
                 (1, 10, 20, 110, 104, '2024-01-10 19:30:00'),
                 (2, 30, 20, 100, 90, '2024-01-12 19:00:00'),
                 (3, 20, 30, 95, 80, '2024-01-14 19:00:00');",
        )
        .unwrap();

        let positions = ["SG", "C", "PG", "SF", "PF"];
        for (idx, position) in positions.iter().enumerate() {
            let player_id = idx as i64 + 1;
            conn.execute(
                "INSERT INTO players (player_id, first_name, last_name) VALUES (?1, 'Player', ?2)",
                params![player_id, format!("{:02}", player_id)],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO roster (player_id, team_id, position) VALUES (?1, ?2, ?3)",
                params![player_id, CLIPPERS, position],
            )
            .unwrap();
        }
        conn.execute_batch(
            "INSERT INTO players (player_id, first_name, last_name) VALUES (50, 'Sam', 'Sample');
             INSERT INTO roster (player_id, team_id, position) VALUES (50, 30, 'SF');",
        )
        .unwrap();

        // Game 1: the same five on the floor all game, 33 back-to-back 20s lineups per period
        for lineup_num in 1..=LINEUPS_IN_GAME_ONE {
            let period = 1 + (lineup_num - 1) / 33;
            let time_in = 720.0 - f64::from((lineup_num - 1) % 33) * 20.0;
            for player_id in 1..=5 {
                insert_interval(
                    &conn,
                    1,
                    CLIPPERS,
                    player_id,
                    period,
                    lineup_num,
                    time_in,
                    time_in - 20.0,
                );
            }
        }

        // Sample player: 30s and 50s stints in a win, one 20s stint in a loss
        insert_interval(&conn, 2, SAMPLE, 50, 1, 1, 720.0, 690.0);
        insert_interval(&conn, 2, SAMPLE, 50, 1, 2, 600.0, 550.0);
        insert_interval(&conn, 3, SAMPLE, 50, 1, 1, 720.0, 700.0);

        (dir, db_path)
    }

    fn engine(db_path: &Path) -> StintQueryEngine<SqliteLineupStore> {
        let store = SqliteLineupStore::open(db_path, Duration::from_secs(1)).unwrap();
        StintQueryEngine::new(store, 50)
    }

    fn params_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    /// Turn a `next_cursor` object back into request parameters
    fn echo_cursor(cursor: &Value, params: &mut HashMap<String, String>) {
        for (key, value) in cursor.as_object().unwrap() {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            params.insert(key.clone(), text);
        }
    }

    fn chain(
        engine: &StintQueryEngine<SqliteLineupStore>,
        kind: QueryKind,
        base: &[(&str, &str)],
    ) -> (Vec<Value>, usize) {
        let mut params = params_of(base);
        let mut rows = Vec::new();
        let mut calls = 0;
        loop {
            calls += 1;
            let body = engine.handle(kind, &params).unwrap();
            let page = body[kind.result_key()].as_array().unwrap().clone();
            if page.is_empty() {
                assert!(body["pagination"].get("next_cursor").is_none());
                break;
            }
            echo_cursor(&body["pagination"]["next_cursor"], &mut params);
            rows.extend(page);
        }
        (rows, calls)
    }

    #[test]
    fn test_wide_lineup_chain_is_lossless() {
        let (_dir, db_path) = setup_test_db();
        let engine = engine(&db_path);

        let (rows, _) = chain(&engine, QueryKind::WideLineups, &[("page_size", "7")]);
        // 130 lineups in game 1, 2 in game 2, 1 in game 3
        assert_eq!(rows.len(), 133);

        let keys: Vec<(i64, i64, i64)> = rows
            .iter()
            .map(|r| {
                (
                    r["game_id"].as_i64().unwrap(),
                    r["team_id"].as_i64().unwrap(),
                    r["lineup_num"].as_i64().unwrap(),
                )
            })
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(keys, sorted);

        let first = &rows[0];
        let slot_positions: Vec<&str> = (1..=5)
            .map(|n| first[format!("player{}_position", n)].as_str().unwrap())
            .collect();
        assert_eq!(slot_positions, vec!["PG", "SG", "SF", "PF", "C"]);
        assert_eq!(first["player1_name"], "Player 03");
    }

    #[test]
    fn test_oversized_page_is_clamped() {
        let (_dir, db_path) = setup_test_db();
        let engine = engine(&db_path);

        let body = engine
            .handle(QueryKind::WideLineups, &params_of(&[("page_size", "250")]))
            .unwrap();
        assert_eq!(body["lineups"].as_array().unwrap().len(), 100);
        assert_eq!(body["pagination"]["page_size"], 100);
        assert_eq!(body["pagination"]["next_cursor"]["last_lineup_num"], 100);
    }

    #[test]
    fn test_rows_appended_after_cursor_are_picked_up() {
        let (_dir, db_path) = setup_test_db();
        let engine = engine(&db_path);
        let size = PageSize::new(100).unwrap();

        let mut cursor: Option<WideLineupCursor> = None;
        loop {
            let request = match cursor.clone() {
                Some(c) => PageRequest::after(size, c),
                None => PageRequest::first(size),
            };
            let page = engine.wide_lineups(&request).unwrap();
            match page.pagination.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        let last = cursor.unwrap();
        assert_eq!((last.game_id, last.team_id, last.lineup_num), (3, SAMPLE, 1));

        let writer = Connection::open(&db_path).unwrap();
        writer
            .execute(
                "INSERT INTO game_schedule
                     (game_id, home_id, away_id, home_score, away_score, game_date)
                 VALUES (4, 10, 30, 101, 99, '2024-01-16 19:30:00')",
                [],
            )
            .unwrap();
        insert_interval(&writer, 4, CLIPPERS, 1, 1, 1, 720.0, 650.0);

        let page = engine.wide_lineups(&PageRequest::after(size, last)).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].game_id, 4);
    }

    #[test]
    fn test_player_stints_chain_with_echoed_cursor() {
        let (_dir, db_path) = setup_test_db();
        let engine = engine(&db_path);

        let (rows, calls) = chain(&engine, QueryKind::PlayerStints, &[("page_size", "4")]);
        // five players x four periods, plus the sample player's three stints
        assert_eq!(rows.len(), 23);
        assert_eq!(calls, 7);

        let first = &rows[0];
        assert_eq!(first["team"], "LA Clippers");
        assert_eq!(first["opponent"], "Denver Nuggets");
        assert_eq!(first["stint_start_time"], "12:00");
        // 33 lineups of 20s from 12:00 run down to 1:00
        assert_eq!(first["stint_end_time"], "1:00");
        assert_eq!(first["stint_number"], 1);
    }

    #[test]
    fn test_game_scope_narrows_player_stints() {
        let (_dir, db_path) = setup_test_db();
        let engine = engine(&db_path);

        let body = engine
            .handle(QueryKind::PlayerStints, &params_of(&[("game_id", "2")]))
            .unwrap();
        let stints = body["stints"].as_array().unwrap();
        assert_eq!(stints.len(), 2);
        assert_eq!(stints[1]["stint_number"], 2);
        assert_eq!(stints[1]["stint_start_time"], "10:00");
    }

    #[test]
    fn test_win_loss_split_end_to_end() {
        let (_dir, db_path) = setup_test_db();
        let engine = engine(&db_path);

        let body = engine
            .handle(QueryKind::WinLossStints, &params_of(&[("player_id", "50")]))
            .unwrap();
        let row = &body["win_loss_stints"][0];
        assert_eq!(row["player_name"], "Sam Sample");
        assert_eq!(row["total_games"], 2);
        assert_eq!(row["avg_stint_length_wins"], "00:40");
        assert_eq!(row["avg_stint_length_losses"], "00:20");
        assert_eq!(row["avg_stint_length_diff"], "00:20");
        assert_eq!(row["avg_stints_per_game_wins"], 2.0);
        assert_eq!(row["avg_stints_per_game_losses"], 1.0);
        assert_eq!(row["avg_stints_per_game_diff"], 1.0);
    }

    #[test]
    fn test_stint_averages_ordered_by_name() {
        let (_dir, db_path) = setup_test_db();
        let engine = engine(&db_path);

        let (rows, _) = chain(&engine, QueryKind::StintAverages, &[("page_size", "2")]);
        let names: Vec<&str> = rows.iter().map(|r| r["player_name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            vec!["Player 01", "Player 02", "Player 03", "Player 04", "Player 05", "Sam Sample"]
        );

        // one stint per period: three of 660s and a short fourth of 620s
        assert_eq!(rows[0]["avg_stints_per_game"], 4.0);
        assert_eq!(rows[0]["avg_stint_length"], "10:50");
        // (30 + 50 + 20) / 3 stints over 2 games
        assert_eq!(rows[5]["avg_stints_per_game"], 1.5);
        assert_eq!(rows[5]["avg_stint_length"], "00:33");
    }

    #[test]
    fn test_partial_cursor_starts_from_the_top() {
        let (_dir, db_path) = setup_test_db();
        let engine = engine(&db_path);

        let body = engine
            .handle(
                QueryKind::WideLineups,
                &params_of(&[("page_size", "1"), ("last_game_id", "3"), ("last_lineup_num", "1")]),
            )
            .unwrap();
        assert_eq!(body["lineups"][0]["game_id"], 1);
        assert_eq!(body["lineups"][0]["lineup_num"], 1);

        let err = engine
            .handle(
                QueryKind::WideLineups,
                &params_of(&[
                    ("last_game_id", "x"),
                    ("last_team_id", "1"),
                    ("last_lineup_num", "1"),
                ]),
            )
            .unwrap_err();
        assert!(err.is_validation());
    }
}
