//! Notification pipeline: turns upstream league transactions into chat
//! messages exactly once per event.
//!
//! - `asset`: compact asset tokens and their display strings
//! - `normalize`: raw upstream records to canonical records
//! - `recency`: reporting window for waivers
//! - `dedup`: write-once "already reported" records
//! - `format` / `chunk`: chat text and chat-sized pieces
//! - `pipeline`: per-category cycles, `delivery`: queue to chat

pub mod asset;
pub mod chunk;
pub mod dedup;
pub mod delivery;
pub mod format;
pub mod normalize;
pub mod pipeline;
pub mod recency;
pub mod reference;

#[cfg(test)]
pub(crate) mod testing;

pub use asset::{AssetResolver, AssetToken};
pub use chunk::chunk;
pub use dedup::DedupStore;
pub use delivery::DeliveryWorker;
pub use normalize::{normalize_matchup, normalize_trade, normalize_waiver, Matchup, MatchupSide};
pub use pipeline::{CycleReport, Pipeline};
pub use recency::is_recent;
pub use reference::{sync_franchises, sync_players, NameLookup, StoreLookup};
