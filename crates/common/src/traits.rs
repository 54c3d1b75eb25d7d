//! Collaborator seams: upstream data, persistent store, queue, chat.
//!
//! The pipeline only talks to these traits. Concrete implementations live in
//! `mfl_client`, `league_store`, and `groupme_client`.

use async_trait::async_trait;

use crate::types::{Franchise, Player, RawMatchup, RawTrade, RawWaiver};
use crate::Result;

/// Field map stored under one key.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Upstream fantasy league data provider.
#[async_trait]
pub trait LeagueSource: Send + Sync {
    async fn franchises(&self) -> Result<Vec<Franchise>>;

    async fn players(&self) -> Result<Vec<Player>>;

    async fn trades(&self) -> Result<Vec<RawTrade>>;

    async fn waivers(&self) -> Result<Vec<RawWaiver>>;

    async fn live_scores(&self) -> Result<Vec<RawMatchup>>;
}

/// Point-lookup key-value store with one namespace per table.
///
/// `get` returns `Ok(None)` only when the key is absent. Any other failure is
/// an error, never a false "not found".
pub trait KeyValueStore {
    fn get(&self, table: &str, key: &str) -> Result<Option<Record>>;

    /// Unconditional upsert (last write wins).
    fn put(&self, table: &str, key: &str, fields: &Record) -> Result<()>;

    /// Write only if the key is absent. Returns `false` when it already existed.
    fn put_if_absent(&self, table: &str, key: &str, fields: &Record) -> Result<bool>;
}

/// A message taken off the queue but not yet acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub id: i64,
    pub body: String,
}

/// Durable at-least-once queue.
pub trait MessageQueue {
    fn publish(&self, queue: &str, body: &str) -> Result<()>;

    /// Oldest unacknowledged messages first. Messages stay on the queue until
    /// acknowledged.
    fn receive(&self, queue: &str, max: usize) -> Result<Vec<QueuedMessage>>;

    fn ack(&self, queue: &str, ids: &[i64]) -> Result<()>;
}

/// Chat platform endpoint that accepts one text message per call.
#[async_trait]
pub trait ChatSink: Send + Sync {
    async fn post(&self, text: &str) -> Result<()>;
}
