//! Domain types shared across the notifier.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── League reference data ─────────────────────────────────────────────

/// A team/owner within the league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Franchise {
    pub id: String,
    pub name: String,
    pub division_id: String,
    /// Remaining blind-bid currency, verbatim from upstream (e.g., "87.50").
    pub blind_bid_dollars: String,
}

/// A player in the league universe, already in display form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    /// "First Last".
    pub name: String,
    pub team: String,
    pub position: String,
}

impl Player {
    /// "Zach Ertz, PHI TE".
    pub fn display(&self) -> String {
        format!("{}, {} {}", self.name, self.team, self.position)
    }
}

// ── Raw upstream records ──────────────────────────────────────────────
//
// Fields are optional so a missing field surfaces as `MalformedInput` at the
// normalization boundary instead of failing the whole fetch.

/// A completed trade between two franchises.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrade {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub franchise: Option<String>,
    #[serde(default)]
    pub franchise2: Option<String>,
    /// Comma-delimited asset tokens, usually with a trailing comma.
    #[serde(default)]
    pub franchise1_gave_up: Option<String>,
    #[serde(default)]
    pub franchise2_gave_up: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// A processed waiver claim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawWaiver {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub franchise: Option<String>,
    /// `<addedId>,|<bid>|[<droppedId>]`.
    #[serde(default)]
    pub transaction: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// One head-to-head matchup from live scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMatchup {
    #[serde(default)]
    pub franchise: Vec<RawMatchupSide>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMatchupSide {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(rename = "playersYetToPlay", default)]
    pub players_yet_to_play: Option<String>,
    #[serde(rename = "playersCurrentlyPlaying", default)]
    pub players_currently_playing: Option<String>,
    #[serde(rename = "gameSecondsRemaining", default)]
    pub game_seconds_remaining: Option<String>,
}

// ── Canonical records ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Trade,
    Waiver,
}

impl Category {
    /// Store table holding reported events of this category.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Trade => "trades",
            Self::Waiver => "waivers",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trade => f.write_str("trade"),
            Self::Waiver => f.write_str("waiver"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub franchise_id: String,
    pub franchise_name: String,
}

/// The resolved parts of a waiver claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiverClaim {
    /// "$69.00".
    pub bid: String,
    pub added: String,
    pub dropped: Option<String>,
}

/// A trade or waiver in display form, rebuilt from upstream on every cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalTransaction {
    pub dedup_key: String,
    /// Epoch seconds from upstream.
    pub timestamp: i64,
    pub category: Category,
    /// One entry for waivers, two (in upstream order) for trades.
    pub participants: Vec<Participant>,
    /// Trades: assets each side gave up. Waivers: the asset won.
    pub assets_by_participant: BTreeMap<String, Vec<String>>,
    /// Present iff `category == Waiver`.
    pub claim: Option<WaiverClaim>,
    pub raw: serde_json::Value,
}

impl CanonicalTransaction {
    pub fn assets_of(&self, franchise_id: &str) -> &[String] {
        self.assets_by_participant
            .get(franchise_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_raw_waiver() {
        let raw: RawWaiver = serde_json::from_str(
            r#"{"timestamp":"1608890400","franchise":"0003","transaction":"14209,|1.00|","type":"BBID_WAIVER"}"#,
        )
        .expect("waiver should deserialize");
        assert_eq!(raw.franchise.as_deref(), Some("0003"));
        assert_eq!(raw.kind.as_deref(), Some("BBID_WAIVER"));
    }

    #[test]
    fn test_deserialize_matchup_with_missing_fields() {
        let raw: RawMatchup = serde_json::from_str(
            r#"{"franchise":[{"id":"0001","score":"101.5","playersYetToPlay":"2"},{"id":"0002"}]}"#,
        )
        .expect("matchup should deserialize");
        assert_eq!(raw.franchise.len(), 2);
        assert_eq!(raw.franchise[0].players_yet_to_play.as_deref(), Some("2"));
        assert!(raw.franchise[1].score.is_none());
    }

    #[test]
    fn test_player_display() {
        let p = Player {
            id: "11247".into(),
            name: "Zach Ertz".into(),
            team: "PHI".into(),
            position: "TE".into(),
        };
        assert_eq!(p.display(), "Zach Ertz, PHI TE");
    }
}
