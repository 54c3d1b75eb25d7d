//! League reference data: franchise and player display records.
//!
//! Sync jobs copy the upstream lists into the store (last write wins). The
//! normalizer reads them back through `NameLookup`.

use common::{Error, Franchise, KeyValueStore, LeagueSource, Player, Record};
use serde_json::Value;
use tracing::info;

pub const FRANCHISES_TABLE: &str = "franchises";
pub const PLAYERS_TABLE: &str = "players";

/// Display-name source for asset and franchise ids.
///
/// `Ok(None)` means the id is unknown; the caller decides whether that is
/// fatal.
pub trait NameLookup {
    fn player(&self, id: &str) -> Result<Option<Player>, Error>;

    fn franchise_name(&self, id: &str) -> Result<Option<String>, Error>;
}

/// `NameLookup` over the persistent store tables written by the sync jobs.
pub struct StoreLookup<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> StoreLookup<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

fn text_field(record: &Record, field: &str) -> Option<String> {
    record.get(field).and_then(Value::as_str).map(str::to_string)
}

impl<S: KeyValueStore + ?Sized> NameLookup for StoreLookup<'_, S> {
    fn player(&self, id: &str) -> Result<Option<Player>, Error> {
        let Some(record) = self.store.get(PLAYERS_TABLE, id)? else {
            return Ok(None);
        };
        let field = |name: &str| {
            text_field(&record, name).ok_or_else(|| {
                Error::MalformedInput(format!("player record {id} has no {name:?} field"))
            })
        };
        Ok(Some(Player {
            id: id.to_string(),
            name: field("name")?,
            team: field("team")?,
            position: field("position")?,
        }))
    }

    fn franchise_name(&self, id: &str) -> Result<Option<String>, Error> {
        let Some(record) = self.store.get(FRANCHISES_TABLE, id)? else {
            return Ok(None);
        };
        text_field(&record, "name").map(Some).ok_or_else(|| {
            Error::MalformedInput(format!("franchise record {id} has no \"name\" field"))
        })
    }
}

pub fn franchise_record(franchise: &Franchise) -> Record {
    let mut r = Record::new();
    r.insert("name".into(), Value::from(franchise.name.as_str()));
    r.insert("division_id".into(), Value::from(franchise.division_id.as_str()));
    r.insert(
        "blind_bid_dollars".into(),
        Value::from(franchise.blind_bid_dollars.as_str()),
    );
    r
}

pub fn player_record(player: &Player) -> Record {
    let mut r = Record::new();
    r.insert("name".into(), Value::from(player.name.as_str()));
    r.insert("team".into(), Value::from(player.team.as_str()));
    r.insert("position".into(), Value::from(player.position.as_str()));
    r
}

/// Refresh the franchises table. Returns the number of franchises written.
pub async fn sync_franchises<L, S>(source: &L, store: &S) -> Result<usize, Error>
where
    L: LeagueSource + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let franchises = source.franchises().await?;
    for franchise in &franchises {
        store.put(FRANCHISES_TABLE, &franchise.id, &franchise_record(franchise))?;
    }
    info!("Synced {} franchises", franchises.len());
    Ok(franchises.len())
}

/// Refresh the players table. Returns the number of players written.
pub async fn sync_players<L, S>(source: &L, store: &S) -> Result<usize, Error>
where
    L: LeagueSource + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let players = source.players().await?;
    for player in &players {
        store.put(PLAYERS_TABLE, &player.id, &player_record(player))?;
    }
    info!("Synced {} players", players.len());
    Ok(players.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{franchise, player, seeded_store, ScriptedSource};
    use league_store::MemoryStore;

    #[test]
    fn test_store_lookup_reads_synced_records() {
        let store = seeded_store();
        let lookup = StoreLookup::new(&store);

        let ertz = lookup.player("11247").expect("lookup").expect("known player");
        assert_eq!(ertz.display(), "Zach Ertz, PHI TE");
        assert_eq!(
            lookup.franchise_name("0003").expect("lookup").as_deref(),
            Some("Jeff Janis Fan Club")
        );
        assert!(lookup.player("99999").expect("lookup").is_none());
    }

    #[test]
    fn test_record_missing_field_is_malformed() {
        let store = MemoryStore::new();
        let mut r = Record::new();
        r.insert("name".into(), Value::from("Zach Ertz"));
        store.put(PLAYERS_TABLE, "11247", &r).expect("put");

        let err = StoreLookup::new(&store).player("11247").unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[tokio::test]
    async fn test_sync_overwrites_previous_values() {
        let store = MemoryStore::new();
        store
            .put(FRANCHISES_TABLE, "0003", &franchise_record(&franchise("0003", "Old Name")))
            .expect("put");

        let source = ScriptedSource {
            franchises: vec![franchise("0003", "Jeff Janis Fan Club"), franchise("0001", "Team One")],
            players: vec![player("14209", "Josh Oliver", "JAC", "TE")],
            ..ScriptedSource::default()
        };

        assert_eq!(sync_franchises(&source, &store).await.expect("sync"), 2);
        assert_eq!(sync_players(&source, &store).await.expect("sync"), 1);

        let lookup = StoreLookup::new(&store);
        assert_eq!(
            lookup.franchise_name("0003").expect("lookup").as_deref(),
            Some("Jeff Janis Fan Club")
        );
        assert_eq!(
            lookup.player("14209").expect("lookup").map(|p| p.display()).as_deref(),
            Some("Josh Oliver, JAC TE")
        );
    }
}
