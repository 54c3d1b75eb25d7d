//! Raw upstream records → canonical records.
//!
//! Required fields are checked here; a missing or unparseable field is
//! `MalformedInput`, an unknown id is a lookup failure. Both abort the cycle.

use std::collections::BTreeMap;

use common::{
    CanonicalTransaction, Category, Error, Participant, RawMatchup, RawMatchupSide, RawTrade,
    RawWaiver, WaiverClaim,
};

use crate::asset::AssetResolver;
use crate::reference::NameLookup;

fn required<'a>(value: &'a Option<String>, record: &str, field: &str) -> Result<&'a str, Error> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::MalformedInput(format!(
            "{record} is missing required field {field:?}"
        ))),
    }
}

fn parse_timestamp(raw: &str, record: &str) -> Result<i64, Error> {
    raw.parse::<i64>().map_err(|_| {
        Error::MalformedInput(format!("{record} timestamp {raw:?} is not epoch seconds"))
    })
}

/// Waiver identity: `<timestamp>-<added display, spaces to dashes, no commas>`.
///
/// Upstream timestamps repeat across franchises in one waiver run, so the
/// added asset is folded in.
pub fn waiver_dedup_key(timestamp: &str, added_display: &str) -> String {
    format!(
        "{}-{}",
        timestamp,
        added_display.replace(' ', "-").replace(',', "")
    )
}

/// Parsed `<addedId>,|<bid>|[<droppedId>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaiverTransaction<'a> {
    pub added_id: &'a str,
    pub bid: &'a str,
    pub dropped_id: Option<&'a str>,
}

impl<'a> WaiverTransaction<'a> {
    pub fn parse(raw: &'a str) -> Result<Self, Error> {
        let bad = |why: &str| Error::MalformedInput(format!("waiver transaction {raw:?}: {why}"));

        let (added_id, rest) = raw.split_once(',').ok_or_else(|| bad("missing ','"))?;
        let added_id = added_id.trim();
        if added_id.is_empty() {
            return Err(bad("no added player"));
        }

        let mut parts = rest.trim_end_matches(',').split('|');
        if parts.next().map(str::trim) != Some("") {
            return Err(bad("expected '|' after the added player"));
        }
        let bid = parts
            .next()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| bad("missing bid amount"))?;
        let dropped_id = parts.next().map(str::trim).filter(|d| !d.is_empty());
        if parts.next().is_some() {
            return Err(bad("too many '|' fields"));
        }

        Ok(Self {
            added_id,
            bid,
            dropped_id,
        })
    }
}

pub fn normalize_waiver<L: NameLookup + ?Sized>(
    raw: &RawWaiver,
    resolver: &AssetResolver<'_, L>,
) -> Result<CanonicalTransaction, Error> {
    let timestamp_raw = required(&raw.timestamp, "waiver", "timestamp")?;
    let franchise_id = required(&raw.franchise, "waiver", "franchise")?;
    let transaction = required(&raw.transaction, "waiver", "transaction")?;

    let timestamp = parse_timestamp(timestamp_raw, "waiver")?;
    let parsed = WaiverTransaction::parse(transaction)?;

    let franchise_name = resolver.franchise_name(franchise_id)?;
    let added = resolver.player(parsed.added_id)?.display();
    let dropped = parsed
        .dropped_id
        .map(|id| resolver.player(id).map(|p| p.display()))
        .transpose()?;

    let mut assets_by_participant = BTreeMap::new();
    assets_by_participant.insert(franchise_id.to_string(), vec![added.clone()]);

    Ok(CanonicalTransaction {
        dedup_key: waiver_dedup_key(timestamp_raw, &added),
        timestamp,
        category: Category::Waiver,
        participants: vec![Participant {
            franchise_id: franchise_id.to_string(),
            franchise_name,
        }],
        assets_by_participant,
        claim: Some(WaiverClaim {
            bid: format!("${}", parsed.bid),
            added,
            dropped,
        }),
        raw: serde_json::to_value(raw)?,
    })
}

pub fn normalize_trade<L: NameLookup + ?Sized>(
    raw: &RawTrade,
    resolver: &AssetResolver<'_, L>,
) -> Result<CanonicalTransaction, Error> {
    let timestamp_raw = required(&raw.timestamp, "trade", "timestamp")?;
    let first_id = required(&raw.franchise, "trade", "franchise")?;
    let second_id = required(&raw.franchise2, "trade", "franchise2")?;
    if first_id == second_id {
        return Err(Error::MalformedInput(format!(
            "trade lists franchise {first_id:?} on both sides"
        )));
    }
    // An empty side is legal (e.g., a player for nothing), a missing one is not.
    let first_gave = raw
        .franchise1_gave_up
        .as_deref()
        .ok_or_else(|| Error::MalformedInput("trade is missing franchise1_gave_up".into()))?;
    let second_gave = raw
        .franchise2_gave_up
        .as_deref()
        .ok_or_else(|| Error::MalformedInput("trade is missing franchise2_gave_up".into()))?;

    let timestamp = parse_timestamp(timestamp_raw, "trade")?;

    let mut participants = Vec::with_capacity(2);
    let mut assets_by_participant = BTreeMap::new();
    for (id, gave_up) in [(first_id, first_gave), (second_id, second_gave)] {
        participants.push(Participant {
            franchise_id: id.to_string(),
            franchise_name: resolver.franchise_name(id)?,
        });
        assets_by_participant.insert(id.to_string(), resolver.resolve_list(gave_up)?);
    }

    Ok(CanonicalTransaction {
        dedup_key: timestamp_raw.to_string(),
        timestamp,
        category: Category::Trade,
        participants,
        assets_by_participant,
        claim: None,
        raw: serde_json::to_value(raw)?,
    })
}

/// One side of a live matchup, in display form.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupSide {
    pub franchise_name: String,
    pub score: f64,
    /// Upstream text, shown as-is ("100.0").
    pub score_display: String,
    pub players_left: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Matchup {
    pub home: MatchupSide,
    pub away: MatchupSide,
}

fn normalize_side<L: NameLookup + ?Sized>(
    side: &RawMatchupSide,
    resolver: &AssetResolver<'_, L>,
) -> Result<MatchupSide, Error> {
    let id = required(&side.id, "matchup side", "id")?;
    let score_display = side
        .score
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("0")
        .to_string();
    let score = score_display.parse::<f64>().map_err(|_| {
        Error::MalformedInput(format!("matchup score {score_display:?} for {id} is not a number"))
    })?;

    Ok(MatchupSide {
        franchise_name: resolver.franchise_name(id)?,
        score,
        score_display,
        players_left: side
            .players_yet_to_play
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("0")
            .to_string(),
    })
}

pub fn normalize_matchup<L: NameLookup + ?Sized>(
    raw: &RawMatchup,
    resolver: &AssetResolver<'_, L>,
) -> Result<Matchup, Error> {
    match raw.franchise.as_slice() {
        [home, away] => Ok(Matchup {
            home: normalize_side(home, resolver)?,
            away: normalize_side(away, resolver)?,
        }),
        other => Err(Error::MalformedInput(format!(
            "matchup has {} franchises, expected 2",
            other.len()
        ))),
    }
}
