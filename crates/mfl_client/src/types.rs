//! MFL export API response envelopes.
//!
//! MFL wraps every list in two levels of objects, serializes a one-element
//! list as a bare object, and omits the list entirely when it is empty.

use common::{Franchise, Player, RawMatchup, RawTrade, RawWaiver};
use serde::{Deserialize, Deserializer};

/// Accepts `[a, b]`, `a`, or a missing field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let parsed = Option::<OneOrMany<T>>::deserialize(deserializer)?;
    Ok(match parsed {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

// ── TYPE=league ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LeagueResponse {
    pub league: LeagueBody,
}

#[derive(Debug, Deserialize)]
pub struct LeagueBody {
    #[serde(default)]
    pub franchises: Option<FranchiseList>,
}

#[derive(Debug, Deserialize)]
pub struct FranchiseList {
    #[serde(default, deserialize_with = "one_or_many")]
    pub franchise: Vec<MflFranchise>,
}

#[derive(Debug, Deserialize)]
pub struct MflFranchise {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub division: String,
    #[serde(rename = "bbidAvailableBalance", default)]
    pub bbid_available_balance: String,
}

impl From<MflFranchise> for Franchise {
    fn from(f: MflFranchise) -> Self {
        Self {
            id: f.id,
            name: f.name,
            division_id: f.division,
            blind_bid_dollars: f.bbid_available_balance,
        }
    }
}

// ── TYPE=players ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PlayersResponse {
    pub players: PlayerList,
}

#[derive(Debug, Deserialize)]
pub struct PlayerList {
    #[serde(default, deserialize_with = "one_or_many")]
    pub player: Vec<MflPlayer>,
}

#[derive(Debug, Deserialize)]
pub struct MflPlayer {
    pub id: String,
    /// "Last, First".
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

const MISSING_FIELD: &str = "N/A";

/// "Ertz, Zach" → "Zach Ertz". Names without a comma (team defenses) pass
/// through trimmed.
pub fn display_name(raw: &str) -> String {
    match raw.split_once(',') {
        Some((last, first)) => format!("{} {}", first.trim(), last.trim()),
        None => raw.trim().to_string(),
    }
}

impl From<MflPlayer> for Player {
    fn from(p: MflPlayer) -> Self {
        Self {
            id: p.id,
            name: p
                .name
                .as_deref()
                .map(display_name)
                .unwrap_or_else(|| MISSING_FIELD.into()),
            team: p.team.unwrap_or_else(|| MISSING_FIELD.into()),
            position: p.position.unwrap_or_else(|| MISSING_FIELD.into()),
        }
    }
}

// ── TYPE=transactions ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TransactionsResponse<T> {
    pub transactions: TransactionList<T>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct TransactionList<T> {
    #[serde(default, deserialize_with = "one_or_many")]
    pub transaction: Vec<T>,
}

pub type TradesResponse = TransactionsResponse<RawTrade>;
pub type WaiversResponse = TransactionsResponse<RawWaiver>;

// ── TYPE=liveScoring ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LiveScoringResponse {
    #[serde(rename = "liveScoring")]
    pub live_scoring: LiveScoringBody,
}

#[derive(Debug, Deserialize)]
pub struct LiveScoringBody {
    #[serde(default, deserialize_with = "one_or_many")]
    pub matchup: Vec<RawMatchup>,
    #[serde(default)]
    pub week: Option<String>,
}
