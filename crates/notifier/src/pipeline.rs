//! Per-category notification cycles.
//!
//! Each cycle is fetch → normalize → (waivers: recency) → dedup → format →
//! chunk → publish → record. Every record in the batch is normalized and
//! checked before anything is written, so a bad record or a failed lookup
//! aborts the cycle with the store untouched. Reported events are recorded
//! only after their chunks are on the queue; a failure in between means the
//! next cycle reports them again.

use std::collections::HashSet;

use chrono::Utc;
use common::config::PolicyConfig;
use common::{
    CanonicalTransaction, Category, Error, KeyValueStore, LeagueSource, MessageQueue,
    NotifierConfig,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::asset::AssetResolver;
use crate::chunk::chunk;
use crate::dedup::DedupStore;
use crate::format::{close_game_messages, trade_messages, waiver_messages};
use crate::normalize::{normalize_matchup, normalize_trade, normalize_waiver};
use crate::recency::is_recent_within;
use crate::reference::{sync_franchises, sync_players, NameLookup, StoreLookup};

/// Outcome of one cycle, logged by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    pub category: String,
    pub fetched: usize,
    pub skipped_stale: usize,
    pub skipped_seen: usize,
    pub reported: usize,
    pub published_chunks: usize,
    pub messages: Vec<String>,
}

impl CycleReport {
    fn new(category: &str, fetched: usize) -> Self {
        Self {
            category: category.to_string(),
            fetched,
            ..Self::default()
        }
    }
}

pub struct Pipeline<'a, L: ?Sized, S: ?Sized> {
    source: &'a L,
    store: &'a S,
    policy: PolicyConfig,
    queue_name: String,
    character_limit: usize,
    dry_run: bool,
    current_year: Option<i32>,
}

impl<'a, L, S> Pipeline<'a, L, S>
where
    L: LeagueSource + ?Sized,
    S: KeyValueStore + MessageQueue + ?Sized,
{
    pub fn new(source: &'a L, store: &'a S, config: &NotifierConfig) -> Self {
        Self {
            source,
            store,
            policy: config.policy.clone(),
            queue_name: config.store.queue_name.clone(),
            character_limit: config.groupme.character_limit,
            dry_run: false,
            current_year: None,
        }
    }

    /// Dry runs neither record reported events nor publish.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Pin the year used for current-season draft picks.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    fn resolver<'l, N: NameLookup + ?Sized>(&self, lookup: &'l N) -> AssetResolver<'l, N> {
        match self.current_year {
            Some(year) => AssetResolver::with_year(lookup, year),
            None => AssetResolver::new(lookup),
        }
    }

    pub async fn sync_franchises(&self) -> Result<usize, Error> {
        sync_franchises(self.source, self.store).await
    }

    pub async fn sync_players(&self) -> Result<usize, Error> {
        sync_players(self.source, self.store).await
    }

    pub async fn run_trades(&self) -> Result<CycleReport, Error> {
        let raw = self.source.trades().await?;
        let mut report = CycleReport::new("trades", raw.len());

        let lookup = StoreLookup::new(self.store);
        let resolver = self.resolver(&lookup);
        let trades = raw
            .iter()
            .map(|r| normalize_trade(r, &resolver))
            .collect::<Result<Vec<_>, _>>()?;

        let fresh = self.select_new(Category::Trade, trades, None, &mut report)?;
        self.finish(report, Category::Trade, trade_messages(&fresh), &fresh)
    }

    /// `now` is epoch seconds; waivers older than the recency window are
    /// neither reported nor recorded.
    pub async fn run_waivers(&self, now: i64) -> Result<CycleReport, Error> {
        let raw = self.source.waivers().await?;
        let mut report = CycleReport::new("waivers", raw.len());

        let lookup = StoreLookup::new(self.store);
        let resolver = self.resolver(&lookup);
        let waivers = raw
            .iter()
            .map(|r| normalize_waiver(r, &resolver))
            .collect::<Result<Vec<_>, _>>()?;

        let fresh = self.select_new(Category::Waiver, waivers, Some(now), &mut report)?;
        self.finish(report, Category::Waiver, waiver_messages(&fresh), &fresh)
    }

    pub async fn run_waivers_now(&self) -> Result<CycleReport, Error> {
        self.run_waivers(Utc::now().timestamp()).await
    }

    /// Close games are recomputed from live scores each time; nothing is
    /// recorded.
    pub async fn run_close_games(&self) -> Result<CycleReport, Error> {
        let raw = self.source.live_scores().await?;
        let mut report = CycleReport::new("close_games", raw.len());

        let lookup = StoreLookup::new(self.store);
        let resolver = self.resolver(&lookup);
        let matchups = raw
            .iter()
            .map(|m| normalize_matchup(m, &resolver))
            .collect::<Result<Vec<_>, _>>()?;

        let messages = close_game_messages(&matchups, self.policy.close_game_margin);
        report.reported = matchups
            .iter()
            .filter(|m| crate::format::is_close_game(m, self.policy.close_game_margin))
            .count();
        self.publish(&mut report, messages)?;
        Ok(report)
    }

    /// Drops stale (when `now` is given) and already-reported records. A key
    /// seen twice in one batch is reported once. Nothing is written here.
    fn select_new(
        &self,
        category: Category,
        batch: Vec<CanonicalTransaction>,
        now: Option<i64>,
        report: &mut CycleReport,
    ) -> Result<Vec<CanonicalTransaction>, Error> {
        let dedup = DedupStore::new(self.store, category);
        let mut batch_keys = HashSet::new();
        let mut fresh = Vec::new();

        for tx in batch {
            if let Some(now) = now {
                if !is_recent_within(tx.timestamp, now, self.policy.recency_window_secs) {
                    debug!("{} {}: stale, skipping", category, tx.dedup_key);
                    report.skipped_stale += 1;
                    continue;
                }
            }

            if !batch_keys.insert(tx.dedup_key.clone()) || dedup.exists(&tx.dedup_key)? {
                debug!("{} {}: already reported", category, tx.dedup_key);
                report.skipped_seen += 1;
                continue;
            }

            fresh.push(tx);
        }

        Ok(fresh)
    }

    /// Publish, then record. A key another invocation recorded in the
    /// meantime was reported by both; the write is skipped.
    fn finish(
        &self,
        mut report: CycleReport,
        category: Category,
        messages: Vec<String>,
        fresh: &[CanonicalTransaction],
    ) -> Result<CycleReport, Error> {
        report.reported = fresh.len();
        self.publish(&mut report, messages)?;

        if !self.dry_run {
            let dedup = DedupStore::new(self.store, category);
            for tx in fresh {
                if !dedup.record(tx)? {
                    warn!("{} {}: recorded concurrently, reported twice", category, tx.dedup_key);
                }
            }
        }
        Ok(report)
    }

    fn publish(&self, report: &mut CycleReport, messages: Vec<String>) -> Result<(), Error> {
        let chunks = chunk(&messages, self.character_limit);
        if self.dry_run {
            for c in &chunks {
                info!("[dry-run] would publish to {}:\n{}", self.queue_name, c);
            }
        } else {
            for c in &chunks {
                self.store.publish(&self.queue_name, c)?;
            }
            report.published_chunks = chunks.len();
        }

        info!(
            "{}: fetched={} stale={} seen={} reported={} chunks={}",
            report.category,
            report.fetched,
            report.skipped_stale,
            report.skipped_seen,
            report.reported,
            report.published_chunks
        );
        report.messages = messages;
        Ok(())
    }
}
