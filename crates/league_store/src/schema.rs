//! Database schema creation.

use rusqlite::{Connection, Result};

/// Create all tables and indexes. Safe to run on every open.
pub fn create_tables(conn: &Connection) -> Result<()> {
    // Records: one JSON field map per (table, key)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS records (
            tbl TEXT NOT NULL,
            key TEXT NOT NULL,
            fields TEXT NOT NULL,
            written_at INTEGER NOT NULL,
            PRIMARY KEY (tbl, key)
        )",
        [],
    )?;

    // Queue: messages stay until acknowledged
    conn.execute(
        "CREATE TABLE IF NOT EXISTS queue_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            queue TEXT NOT NULL,
            body TEXT NOT NULL,
            enqueued_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_queue_order ON queue_messages(queue, id)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().expect("in-memory db");
        create_tables(&conn).expect("first create");
        create_tables(&conn).expect("second create");

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('records', 'queue_messages')",
                [],
                |row| row.get(0),
            )
            .expect("count tables");
        assert_eq!(count, 2);
    }
}
