//! SQLite-backed store and queue.
//!
//! Every call is a blocking round trip on a single connection. Failures map to
//! `Error::Store` / `Error::Queue`, which callers treat as transient.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use common::{Error, KeyValueStore, MessageQueue, QueuedMessage, Record};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::schema::create_tables;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

fn store_err(e: rusqlite::Error) -> Error {
    Error::Store(e.to_string())
}

fn queue_err(e: rusqlite::Error) -> Error {
    Error::Queue(e.to_string())
}

impl SqliteStore {
    /// Open (or create) the database at `path`. `:memory:` opens a private
    /// in-memory database.
    pub fn open(path: &str) -> Result<Self, Error> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(path)
        }
        .map_err(|e| Error::Store(format!("failed to open {}: {}", path, e)))?;

        conn.busy_timeout(std::time::Duration::from_secs(5))
            .map_err(store_err)?;
        create_tables(&conn).map_err(store_err)?;

        info!("Store initialized at {}", path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.conn
            .lock()
            .map_err(|_| Error::Store("connection mutex poisoned".into()))
    }

    /// Unacknowledged messages waiting on `queue`.
    pub fn pending(&self, queue: &str) -> Result<usize, Error> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM queue_messages WHERE queue = ?1",
                params![queue],
                |row| row.get(0),
            )
            .map_err(queue_err)?;
        Ok(count as usize)
    }
}

fn encode(fields: &Record) -> Result<String, Error> {
    Ok(serde_json::to_string(fields)?)
}

fn decode(raw: &str) -> Result<Record, Error> {
    Ok(serde_json::from_str(raw)?)
}

impl KeyValueStore for SqliteStore {
    fn get(&self, table: &str, key: &str) -> Result<Option<Record>, Error> {
        let conn = self.conn()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT fields FROM records WHERE tbl = ?1 AND key = ?2",
                params![table, key],
                |row| row.get(0),
            )
            .optional()
            .map_err(store_err)?;

        raw.as_deref().map(decode).transpose()
    }

    fn put(&self, table: &str, key: &str, fields: &Record) -> Result<(), Error> {
        let json = encode(fields)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO records (tbl, key, fields, written_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(tbl, key) DO UPDATE SET fields = excluded.fields, written_at = excluded.written_at",
            params![table, key, json, Utc::now().timestamp()],
        )
        .map_err(store_err)?;
        debug!("put {}/{}", table, key);
        Ok(())
    }

    fn put_if_absent(&self, table: &str, key: &str, fields: &Record) -> Result<bool, Error> {
        let json = encode(fields)?;
        let conn = self.conn()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO records (tbl, key, fields, written_at) VALUES (?1, ?2, ?3, ?4)",
                params![table, key, json, Utc::now().timestamp()],
            )
            .map_err(store_err)?;
        debug!("put_if_absent {}/{} inserted={}", table, key, inserted == 1);
        Ok(inserted == 1)
    }
}

impl MessageQueue for SqliteStore {
    fn publish(&self, queue: &str, body: &str) -> Result<(), Error> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO queue_messages (queue, body, enqueued_at) VALUES (?1, ?2, ?3)",
            params![queue, body, Utc::now().timestamp()],
        )
        .map_err(queue_err)?;
        debug!("Published {} chars to {}", body.chars().count(), queue);
        Ok(())
    }

    fn receive(&self, queue: &str, max: usize) -> Result<Vec<QueuedMessage>, Error> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, body FROM queue_messages WHERE queue = ?1 ORDER BY id ASC LIMIT ?2",
            )
            .map_err(queue_err)?;
        let rows = stmt
            .query_map(params![queue, max as i64], |row| {
                Ok(QueuedMessage {
                    id: row.get(0)?,
                    body: row.get(1)?,
                })
            })
            .map_err(queue_err)?;

        let messages = rows.collect::<Result<Vec<_>, _>>().map_err(queue_err)?;
        Ok(messages)
    }

    fn ack(&self, queue: &str, ids: &[i64]) -> Result<(), Error> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(queue_err)?;
        for id in ids {
            tx.execute(
                "DELETE FROM queue_messages WHERE queue = ?1 AND id = ?2",
                params![queue, id],
            )
            .map_err(queue_err)?;
        }
        tx.commit().map_err(queue_err)?;
        debug!("Acked {} messages on {}", ids.len(), queue);
        Ok(())
    }
}
