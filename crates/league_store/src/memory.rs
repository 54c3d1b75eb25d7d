//! In-memory store and queue.
//!
//! Same observable semantics as `SqliteStore`, nothing survives the process.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use common::{Error, KeyValueStore, MessageQueue, QueuedMessage, Record};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<(String, String), Record>,
    queues: Mutex<Vec<(String, QueuedMessage)>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys written to `table`.
    pub fn len(&self, table: &str) -> usize {
        self.records.iter().filter(|e| e.key().0 == table).count()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bodies waiting on `queue`, oldest first.
    pub fn pending(&self, queue: &str) -> Vec<String> {
        self.queues
            .lock()
            .map(|q| {
                q.iter()
                    .filter(|(name, _)| name == queue)
                    .map(|(_, m)| m.body.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn slot(table: &str, key: &str) -> (String, String) {
    (table.to_string(), key.to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, table: &str, key: &str) -> Result<Option<Record>, Error> {
        Ok(self.records.get(&slot(table, key)).map(|r| r.value().clone()))
    }

    fn put(&self, table: &str, key: &str, fields: &Record) -> Result<(), Error> {
        self.records.insert(slot(table, key), fields.clone());
        Ok(())
    }

    fn put_if_absent(&self, table: &str, key: &str, fields: &Record) -> Result<bool, Error> {
        match self.records.entry(slot(table, key)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(v) => {
                v.insert(fields.clone());
                Ok(true)
            }
        }
    }
}

impl MessageQueue for MemoryStore {
    fn publish(&self, queue: &str, body: &str) -> Result<(), Error> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.queues
            .lock()
            .map_err(|_| Error::Queue("queue mutex poisoned".into()))?
            .push((
                queue.to_string(),
                QueuedMessage {
                    id,
                    body: body.to_string(),
                },
            ));
        Ok(())
    }

    fn receive(&self, queue: &str, max: usize) -> Result<Vec<QueuedMessage>, Error> {
        let guard = self
            .queues
            .lock()
            .map_err(|_| Error::Queue("queue mutex poisoned".into()))?;
        Ok(guard
            .iter()
            .filter(|(name, _)| name == queue)
            .take(max)
            .map(|(_, m)| m.clone())
            .collect())
    }

    fn ack(&self, queue: &str, ids: &[i64]) -> Result<(), Error> {
        self.queues
            .lock()
            .map_err(|_| Error::Queue("queue mutex poisoned".into()))?
            .retain(|(name, m)| !(name == queue && ids.contains(&m.id)));
        Ok(())
    }
}
