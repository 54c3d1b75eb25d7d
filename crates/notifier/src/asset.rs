//! Asset tokens and their display form.
//!
//! Upstream encodes tradable/claimable assets as compact tokens:
//!
//! | Token | Display |
//! |---|---|
//! | `BB_<amount>` | `$<amount>` |
//! | `FP_<franchiseId>_<year>_<round>` | `<franchise> <year> Round <round> Draft Pick` |
//! | `DP_<roundOffset>_<pick>` | `<currentYear> Round <roundOffset+1> Pick <pick>` |
//! | `<playerId>` | `<name>, <team> <position>` |
//!
//! Prefixes are checked in that order. Anything else that is non-empty is a
//! player id, so an unknown token fails at lookup time with the token in the
//! error.

use chrono::{Datelike, Utc};
use common::{Error, Player};

use crate::reference::NameLookup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetToken {
    /// Blind-bid currency, amount kept verbatim (e.g., "69.00").
    BlindBidCurrency(String),
    FutureDraftPick {
        franchise_id: String,
        year: u32,
        round: u32,
    },
    /// Pick in the current season's draft. `round_offset` is zero-based.
    CurrentDraftPick { round_offset: u32, pick_number: u32 },
    PlayerRef(String),
}

fn malformed(raw: &str, why: &str) -> Error {
    Error::MalformedInput(format!("asset token {raw:?}: {why}"))
}

fn number(raw: &str, part: &str, what: &str) -> Result<u32, Error> {
    part.parse::<u32>()
        .map_err(|_| malformed(raw, &format!("{what} {part:?} is not a number")))
}

/// Fields after a `XX_` prefix, or an error if the separator is missing.
fn prefixed_fields<'a>(raw: &'a str, prefix: &str) -> Option<Result<Vec<&'a str>, Error>> {
    let rest = raw.strip_prefix(prefix)?;
    Some(match rest.strip_prefix('_') {
        Some(body) => Ok(body.split('_').collect()),
        None => Err(malformed(raw, &format!("expected '_' after {prefix}"))),
    })
}

impl AssetToken {
    /// Classify one raw token. Blank tokens yield `None`.
    pub fn parse(raw: &str) -> Result<Option<Self>, Error> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        if let Some(fields) = prefixed_fields(raw, "BB") {
            return match fields?.as_slice() {
                [amount] if !amount.is_empty() => {
                    Ok(Some(Self::BlindBidCurrency(amount.to_string())))
                }
                _ => Err(malformed(raw, "expected BB_<amount>")),
            };
        }

        if let Some(fields) = prefixed_fields(raw, "FP") {
            return match fields?.as_slice() {
                [franchise_id, year, round] if !franchise_id.is_empty() => {
                    Ok(Some(Self::FutureDraftPick {
                        franchise_id: franchise_id.to_string(),
                        year: number(raw, year, "year")?,
                        round: number(raw, round, "round")?,
                    }))
                }
                _ => Err(malformed(raw, "expected FP_<franchiseId>_<year>_<round>")),
            };
        }

        if let Some(fields) = prefixed_fields(raw, "DP") {
            return match fields?.as_slice() {
                [round_offset, pick] => Ok(Some(Self::CurrentDraftPick {
                    round_offset: number(raw, round_offset, "round")?,
                    pick_number: number(raw, pick, "pick")?,
                })),
                _ => Err(malformed(raw, "expected DP_<round>_<pick>")),
            };
        }

        Ok(Some(Self::PlayerRef(raw.to_string())))
    }
}

/// Renders asset tokens through a name lookup.
pub struct AssetResolver<'a, L: ?Sized> {
    lookup: &'a L,
    current_year: i32,
}

impl<'a, L: NameLookup + ?Sized> AssetResolver<'a, L> {
    /// Current-season picks are labelled with today's calendar year.
    pub fn new(lookup: &'a L) -> Self {
        Self::with_year(lookup, Utc::now().year())
    }

    pub fn with_year(lookup: &'a L, current_year: i32) -> Self {
        Self {
            lookup,
            current_year,
        }
    }

    pub fn player(&self, id: &str) -> Result<Player, Error> {
        self.lookup
            .player(id)?
            .ok_or_else(|| Error::player_lookup(id))
    }

    pub fn franchise_name(&self, id: &str) -> Result<String, Error> {
        self.lookup
            .franchise_name(id)?
            .ok_or_else(|| Error::franchise_lookup(id))
    }

    pub fn render(&self, token: &AssetToken) -> Result<String, Error> {
        Ok(match token {
            AssetToken::BlindBidCurrency(amount) => format!("${amount}"),
            AssetToken::FutureDraftPick {
                franchise_id,
                year,
                round,
            } => format!(
                "{} {} Round {} Draft Pick",
                self.franchise_name(franchise_id)?,
                year,
                round
            ),
            AssetToken::CurrentDraftPick {
                round_offset,
                pick_number,
            } => format!(
                "{} Round {} Pick {}",
                self.current_year,
                round_offset + 1,
                pick_number
            ),
            AssetToken::PlayerRef(id) => self.player(id)?.display(),
        })
    }

    /// Resolve one raw token; blank tokens resolve to nothing.
    pub fn resolve(&self, raw: &str) -> Result<Option<String>, Error> {
        AssetToken::parse(raw)?
            .map(|token| self.render(&token))
            .transpose()
    }

    /// Resolve a comma-delimited token list in order, dropping blanks.
    pub fn resolve_list(&self, raw: &str) -> Result<Vec<String>, Error> {
        let mut resolved = Vec::new();
        for token in raw.split(',') {
            if let Some(display) = self.resolve(token)? {
                resolved.push(display);
            }
        }
        Ok(resolved)
    }
}
