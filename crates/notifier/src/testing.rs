//! Fakes shared by the unit tests in this crate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use common::{
    ChatSink, Error, Franchise, KeyValueStore, LeagueSource, MessageQueue, Player, QueuedMessage,
    RawMatchup, RawTrade, RawWaiver, Record, Result,
};
use league_store::MemoryStore;

use crate::reference::{franchise_record, player_record, FRANCHISES_TABLE, PLAYERS_TABLE};

pub fn franchise(id: &str, name: &str) -> Franchise {
    Franchise {
        id: id.into(),
        name: name.into(),
        division_id: "00".into(),
        blind_bid_dollars: "100.00".into(),
    }
}

pub fn player(id: &str, name: &str, team: &str, position: &str) -> Player {
    Player {
        id: id.into(),
        name: name.into(),
        team: team.into(),
        position: position.into(),
    }
}

/// Store with three franchises and two players already synced.
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    for f in [
        franchise("0001", "Team One"),
        franchise("0002", "Team Two"),
        franchise("0003", "Jeff Janis Fan Club"),
    ] {
        store
            .put(FRANCHISES_TABLE, &f.id, &franchise_record(&f))
            .expect("seed franchise");
    }
    for p in [
        player("14209", "Josh Oliver", "JAC", "TE"),
        player("11247", "Zach Ertz", "PHI", "TE"),
    ] {
        store
            .put(PLAYERS_TABLE, &p.id, &player_record(&p))
            .expect("seed player");
    }
    store
}

/// Canned upstream responses. `fail` makes every call return an HTTP error.
#[derive(Default)]
pub struct ScriptedSource {
    pub franchises: Vec<Franchise>,
    pub players: Vec<Player>,
    pub trades: Vec<RawTrade>,
    pub waivers: Vec<RawWaiver>,
    pub matchups: Vec<RawMatchup>,
    pub fail: bool,
}

impl ScriptedSource {
    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(Error::Http("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl LeagueSource for ScriptedSource {
    async fn franchises(&self) -> Result<Vec<Franchise>> {
        self.check()?;
        Ok(self.franchises.clone())
    }

    async fn players(&self) -> Result<Vec<Player>> {
        self.check()?;
        Ok(self.players.clone())
    }

    async fn trades(&self) -> Result<Vec<RawTrade>> {
        self.check()?;
        Ok(self.trades.clone())
    }

    async fn waivers(&self) -> Result<Vec<RawWaiver>> {
        self.check()?;
        Ok(self.waivers.clone())
    }

    async fn live_scores(&self) -> Result<Vec<RawMatchup>> {
        self.check()?;
        Ok(self.matchups.clone())
    }
}

/// Records posted messages. Posting fails once `fail_after` posts succeeded.
#[derive(Default)]
pub struct RecordingChat {
    pub posted: Mutex<Vec<String>>,
    pub fail_after: Option<usize>,
}

impl RecordingChat {
    pub fn posted(&self) -> Vec<String> {
        self.posted.lock().expect("chat mutex").clone()
    }
}

#[async_trait]
impl ChatSink for RecordingChat {
    async fn post(&self, text: &str) -> Result<()> {
        let mut posted = self.posted.lock().expect("chat mutex");
        if self.fail_after.is_some_and(|n| posted.len() >= n) {
            return Err(Error::GroupMe("502 Bad Gateway".into()));
        }
        posted.push(text.to_string());
        Ok(())
    }
}

/// `MemoryStore` with switchable faults. Reads of `failing_table` return a
/// store error; publishing fails while `queue_down` is set.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub failing_table: Option<&'static str>,
    pub queue_down: AtomicBool,
}

impl FlakyStore {
    pub fn over(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn set_queue_down(&self, down: bool) {
        self.queue_down.store(down, Ordering::SeqCst);
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, table: &str, key: &str) -> Result<Option<Record>> {
        if self.failing_table == Some(table) {
            return Err(Error::Store("database is locked".into()));
        }
        self.inner.get(table, key)
    }

    fn put(&self, table: &str, key: &str, fields: &Record) -> Result<()> {
        self.inner.put(table, key, fields)
    }

    fn put_if_absent(&self, table: &str, key: &str, fields: &Record) -> Result<bool> {
        self.inner.put_if_absent(table, key, fields)
    }
}

impl MessageQueue for FlakyStore {
    fn publish(&self, queue: &str, body: &str) -> Result<()> {
        if self.queue_down.load(Ordering::SeqCst) {
            return Err(Error::Queue("queue unavailable".into()));
        }
        self.inner.publish(queue, body)
    }

    fn receive(&self, queue: &str, max: usize) -> Result<Vec<QueuedMessage>> {
        self.inner.receive(queue, max)
    }

    fn ack(&self, queue: &str, ids: &[i64]) -> Result<()> {
        self.inner.ack(queue, ids)
    }
}
