//! Connection PRAGMAs shared by every SQLite handle the crate opens

use rusqlite::Connection;

/// WAL, NORMAL sync, in-memory temp store, 256MB mmap, 64MB page cache,
/// autocheckpoint every 1000 pages
pub fn apply_optimized_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    // journal_mode answers with the mode now in effect
    let mode: String = conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "temp_store", "MEMORY")?;
    conn.pragma_update(None, "mmap_size", 268_435_456i64)?;
    conn.pragma_update(None, "cache_size", -64_000i64)?;
    conn.pragma_update(None, "wal_autocheckpoint", 1000)?;

    log::debug!("📊 Applied SQLite PRAGMAs (journal_mode={})", mode);
    Ok(())
}
