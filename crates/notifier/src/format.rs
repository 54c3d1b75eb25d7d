//! Chat text for each event category.
//!
//! Every batch formatter returns an empty `Vec` when there is nothing to
//! report, never a banner on its own.

use common::{CanonicalTransaction, WaiverClaim};

use crate::normalize::Matchup;

pub const TRADE_BANNER: &str = "🚨TRADE COMPLETED🚨";
pub const WAIVER_BANNER: &str = "✅WAIVER CLAIMS COMPLETED✅\n";
pub const CLOSE_GAMES_BANNER: &str = "👀CLOSE GAMES👀\n";

// ── Trades ────────────────────────────────────────────────────────────

pub fn render_trade(tx: &CanonicalTransaction) -> String {
    let mut sections = vec![TRADE_BANNER.to_string()];
    for participant in &tx.participants {
        let mut section = format!("{} GIVES UP:", participant.franchise_name);
        for asset in tx.assets_of(&participant.franchise_id) {
            section.push_str("\n- ");
            section.push_str(asset);
        }
        sections.push(section);
    }
    sections.join("\n\n")
}

/// One message per trade, in input order.
pub fn trade_messages(trades: &[CanonicalTransaction]) -> Vec<String> {
    trades.iter().map(render_trade).collect()
}

// ── Waivers ───────────────────────────────────────────────────────────

/// `"<franchise> won <added> with a <bid> bid[ and dropped <dropped>]\n"`.
pub fn render_waiver(franchise_name: &str, claim: &WaiverClaim) -> String {
    let mut line = format!(
        "{} won {} with a {} bid",
        franchise_name, claim.added, claim.bid
    );
    if let Some(dropped) = &claim.dropped {
        line.push_str(" and dropped ");
        line.push_str(dropped);
    }
    line.push('\n');
    line
}

/// All of a cycle's waiver results under one banner.
pub fn waiver_messages(waivers: &[CanonicalTransaction]) -> Vec<String> {
    let lines: Vec<String> = waivers
        .iter()
        .filter_map(|tx| {
            let claim = tx.claim.as_ref()?;
            let name = tx.participants.first()?.franchise_name.as_str();
            Some(render_waiver(name, claim))
        })
        .collect();

    if lines.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::with_capacity(lines.len() + 1);
    parts.push(WAIVER_BANNER.to_string());
    parts.extend(lines);
    vec![parts.join("\n")]
}

// ── Close games ───────────────────────────────────────────────────────

pub fn is_close_game(matchup: &Matchup, margin: f64) -> bool {
    (matchup.home.score - matchup.away.score).abs() <= margin
}

/// Equal scores read "LOSING TO".
pub fn render_close_game(matchup: &Matchup) -> String {
    let (a, b) = (&matchup.home, &matchup.away);
    let status = if a.score > b.score { "BEATING" } else { "LOSING TO" };
    format!(
        "{} {} {} {} - {}\n- {} players left: {}\n- {} players left: {}\n",
        a.franchise_name,
        status,
        b.franchise_name,
        a.score_display,
        b.score_display,
        a.franchise_name,
        a.players_left,
        b.franchise_name,
        b.players_left
    )
}

pub fn close_game_messages(matchups: &[Matchup], margin: f64) -> Vec<String> {
    let games: Vec<String> = matchups
        .iter()
        .filter(|m| is_close_game(m, margin))
        .map(render_close_game)
        .collect();

    if games.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::with_capacity(games.len() + 1);
    parts.push(CLOSE_GAMES_BANNER.to_string());
    parts.extend(games);
    vec![parts.join("\n")]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::MatchupSide;
    use common::{Category, Participant};
    use std::collections::BTreeMap;

    fn side(name: &str, score: &str, left: &str) -> MatchupSide {
        MatchupSide {
            franchise_name: name.into(),
            score: score.parse().expect("score"),
            score_display: score.into(),
            players_left: left.into(),
        }
    }

    fn matchup(a: f64, b: f64) -> Matchup {
        Matchup {
            home: side("Team One", &format!("{a:.1}"), "2"),
            away: side("Team Two", &format!("{b:.1}"), "1"),
        }
    }

    fn waiver(name: &str, claim: WaiverClaim) -> CanonicalTransaction {
        CanonicalTransaction {
            dedup_key: "k".into(),
            timestamp: 0,
            category: Category::Waiver,
            participants: vec![Participant {
                franchise_id: "0003".into(),
                franchise_name: name.into(),
            }],
            assets_by_participant: BTreeMap::new(),
            claim: Some(claim),
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_single_waiver_message() {
        let messages = waiver_messages(&[waiver(
            "Jeff Janis Fan Club",
            WaiverClaim {
                bid: "$69.00".into(),
                added: "Zach Ertz, PHI TE".into(),
                dropped: None,
            },
        )]);
        assert_eq!(
            messages,
            vec!["✅WAIVER CLAIMS COMPLETED✅\n\nJeff Janis Fan Club won Zach Ertz, PHI TE with a $69.00 bid\n".to_string()]
        );
    }

    #[test]
    fn test_waiver_drop_clause_and_joining() {
        let messages = waiver_messages(&[
            waiver(
                "Team One",
                WaiverClaim {
                    bid: "$10.00".into(),
                    added: "Josh Oliver, JAC TE".into(),
                    dropped: Some("Zach Ertz, PHI TE".into()),
                },
            ),
            waiver(
                "Team Two",
                WaiverClaim {
                    bid: "$1.00".into(),
                    added: "Zach Ertz, PHI TE".into(),
                    dropped: None,
                },
            ),
        ]);
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0],
            "✅WAIVER CLAIMS COMPLETED✅\n\n\
             Team One won Josh Oliver, JAC TE with a $10.00 bid and dropped Zach Ertz, PHI TE\n\n\
             Team Two won Zach Ertz, PHI TE with a $1.00 bid\n"
        );
    }

    #[test]
    fn test_empty_batches_produce_nothing() {
        assert!(waiver_messages(&[]).is_empty());
        assert!(trade_messages(&[]).is_empty());
        assert!(close_game_messages(&[], 10.0).is_empty());
        assert!(close_game_messages(&[matchup(150.0, 100.0)], 10.0).is_empty());
    }

    #[test]
    fn test_trade_layout() {
        let mut assets = BTreeMap::new();
        assets.insert(
            "0002".to_string(),
            vec!["Zach Ertz, PHI TE".to_string(), "$5".to_string()],
        );
        assets.insert("0001".to_string(), vec!["2026 Round 1 Pick 1".to_string()]);
        let tx = CanonicalTransaction {
            dedup_key: "1600000000".into(),
            timestamp: 1_600_000_000,
            category: Category::Trade,
            participants: vec![
                Participant {
                    franchise_id: "0002".into(),
                    franchise_name: "Team Two".into(),
                },
                Participant {
                    franchise_id: "0001".into(),
                    franchise_name: "Team One".into(),
                },
            ],
            assets_by_participant: assets,
            claim: None,
            raw: serde_json::Value::Null,
        };

        assert_eq!(
            render_trade(&tx),
            "🚨TRADE COMPLETED🚨\n\nTeam Two GIVES UP:\n- Zach Ertz, PHI TE\n- $5\n\nTeam One GIVES UP:\n- 2026 Round 1 Pick 1"
        );
    }

    #[test]
    fn test_tie_reads_losing_to() {
        let text = render_close_game(&matchup(100.0, 100.0));
        assert!(text.starts_with("Team One LOSING TO Team Two 100.0 - 100.0\n"));
        let text = render_close_game(&matchup(100.5, 100.0));
        assert!(text.starts_with("Team One BEATING Team Two"));
    }

    #[test]
    fn test_close_game_margin_is_inclusive() {
        assert!(is_close_game(&matchup(110.0, 100.0), 10.0));
        assert!(!is_close_game(&matchup(110.5, 100.0), 10.0));
        assert!(is_close_game(&matchup(90.0, 100.0), 10.0));
    }

    #[test]
    fn test_close_game_block() {
        let messages = close_game_messages(&[matchup(98.0, 100.0), matchup(40.0, 90.0)], 10.0);
        assert_eq!(
            messages,
            vec!["👀CLOSE GAMES👀\n\nTeam One LOSING TO Team Two 98.0 - 100.0\n- Team One players left: 2\n- Team Two players left: 1\n".to_string()]
        );
    }
}
