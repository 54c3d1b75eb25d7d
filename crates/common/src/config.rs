//! Notifier configuration types.

use serde::{Deserialize, Serialize};

/// Top-level notifier configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Upstream league data provider.
    #[serde(default)]
    pub mfl: MflConfig,

    /// Chat platform delivery.
    #[serde(default)]
    pub groupme: GroupMeConfig,

    /// Persistent store and message queue.
    #[serde(default)]
    pub store: StoreConfig,

    /// Reporting policy knobs.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// MyFantasyLeague export API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MflConfig {
    #[serde(default = "default_mfl_base_url")]
    pub base_url: String,

    /// Season year used in the export path (e.g., "2024").
    #[serde(default)]
    pub year: String,

    #[serde(default)]
    pub league_id: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Upstream throttles aggressive clients; keep this low.
    #[serde(default = "default_mfl_requests_per_sec")]
    pub requests_per_sec: u32,
}

/// GroupMe bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMeConfig {
    #[serde(default = "default_groupme_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub bot_id: String,

    /// Max characters per posted message.
    #[serde(default = "default_character_limit")]
    pub character_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file. `:memory:` is accepted for throwaway runs.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_queue_name")]
    pub queue_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Waivers older than this are neither reported nor persisted.
    #[serde(default = "default_recency_window")]
    pub recency_window_secs: i64,

    /// Max point gap for a matchup to count as close.
    #[serde(default = "default_close_game_margin")]
    pub close_game_margin: f64,

    /// Queue messages pulled per delivery batch.
    #[serde(default = "default_delivery_batch_size")]
    pub delivery_batch_size: usize,
}

// ── Defaults ──────────────────────────────────────────────────────────

/// 24h plus a 15 minute grace for polling gaps and clock skew.
pub const DEFAULT_RECENCY_WINDOW_SECS: i64 = 87_300;

/// GroupMe rejects bot posts above this many characters.
pub const GROUPME_CHARACTER_LIMIT: usize = 450;

pub const DEFAULT_QUEUE_NAME: &str = "BDFLMessageQueue";

fn default_mfl_base_url() -> String {
    "https://api.myfantasyleague.com".into()
}
fn default_mfl_requests_per_sec() -> u32 {
    2
}

fn default_groupme_base_url() -> String {
    "https://api.groupme.com/v3".into()
}
fn default_character_limit() -> usize {
    GROUPME_CHARACTER_LIMIT
}

fn default_db_path() -> String {
    "league-notifier.db".into()
}
fn default_queue_name() -> String {
    DEFAULT_QUEUE_NAME.into()
}

fn default_recency_window() -> i64 {
    DEFAULT_RECENCY_WINDOW_SECS
}
fn default_close_game_margin() -> f64 {
    10.0
}
fn default_delivery_batch_size() -> usize {
    10
}

impl Default for MflConfig {
    fn default() -> Self {
        Self {
            base_url: default_mfl_base_url(),
            year: String::new(),
            league_id: String::new(),
            username: String::new(),
            password: String::new(),
            requests_per_sec: default_mfl_requests_per_sec(),
        }
    }
}

impl Default for GroupMeConfig {
    fn default() -> Self {
        Self {
            base_url: default_groupme_base_url(),
            api_key: String::new(),
            bot_id: String::new(),
            character_limit: default_character_limit(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            queue_name: default_queue_name(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            recency_window_secs: default_recency_window(),
            close_game_margin: default_close_game_margin(),
            delivery_batch_size: default_delivery_batch_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let cfg: NotifierConfig = serde_json::from_str("{}").expect("empty config parses");
        assert_eq!(cfg.policy.recency_window_secs, 87_300);
        assert_eq!(cfg.groupme.character_limit, 450);
        assert_eq!(cfg.store.queue_name, "BDFLMessageQueue");
        assert!((cfg.policy.close_game_margin - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let cfg: NotifierConfig =
            serde_json::from_str(r#"{"mfl": {"league_id": "12345", "year": "2024"}}"#)
                .expect("partial config parses");
        assert_eq!(cfg.mfl.league_id, "12345");
        assert_eq!(cfg.mfl.base_url, "https://api.myfantasyleague.com");
        assert_eq!(cfg.mfl.requests_per_sec, 2);
    }
}
