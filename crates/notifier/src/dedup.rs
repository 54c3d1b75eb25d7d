//! "Already reported" bookkeeping, one store table per category.

use common::{CanonicalTransaction, Category, Error, KeyValueStore, Record};
use serde_json::{json, Value};
use tracing::debug;

/// Persisted form of a reported event. Written once, only ever checked for
/// existence afterwards.
pub fn reported_record(tx: &CanonicalTransaction) -> Record {
    let mut r = Record::new();
    r.insert("key".into(), Value::from(tx.dedup_key.as_str()));
    r.insert("timestamp".into(), Value::from(tx.timestamp.to_string()));

    match tx.category {
        Category::Waiver => {
            let participant = tx.participants.first();
            r.insert(
                "franchise_id".into(),
                json!(participant.map(|p| p.franchise_id.as_str())),
            );
            r.insert(
                "franchise_name".into(),
                json!(participant.map(|p| p.franchise_name.as_str())),
            );
            r.insert(
                "raw_transaction".into(),
                tx.raw.get("transaction").cloned().unwrap_or(Value::Null),
            );
            r.insert(
                "formatted_transaction".into(),
                match &tx.claim {
                    Some(c) => json!([c.bid, c.added, c.dropped]),
                    None => Value::Null,
                },
            );
            r.insert(
                "type".into(),
                tx.raw.get("type").cloned().unwrap_or(Value::Null),
            );
        }
        Category::Trade => {
            r.insert(
                "franchise_ids".into(),
                json!(tx
                    .participants
                    .iter()
                    .map(|p| p.franchise_id.as_str())
                    .collect::<Vec<_>>()),
            );
            r.insert(
                "franchise_names".into(),
                json!(tx
                    .participants
                    .iter()
                    .map(|p| p.franchise_name.as_str())
                    .collect::<Vec<_>>()),
            );
            r.insert(
                "gave_up".into(),
                json!(tx
                    .participants
                    .iter()
                    .map(|p| tx.assets_of(&p.franchise_id))
                    .collect::<Vec<_>>()),
            );
            r.insert("raw".into(), tx.raw.clone());
        }
    }
    r
}

/// Dedup view over one category's table.
pub struct DedupStore<'a, S: ?Sized> {
    store: &'a S,
    category: Category,
}

impl<'a, S: KeyValueStore + ?Sized> DedupStore<'a, S> {
    pub fn new(store: &'a S, category: Category) -> Self {
        Self { store, category }
    }

    /// Point lookup. Only an absent key means "not seen"; store failures
    /// propagate.
    pub fn exists(&self, key: &str) -> Result<bool, Error> {
        Ok(self.store.get(self.category.table(), key)?.is_some())
    }

    /// Write-once. Returns `false` if the key was already present, in which
    /// case the stored record is left untouched.
    pub fn record(&self, tx: &CanonicalTransaction) -> Result<bool, Error> {
        let inserted =
            self.store
                .put_if_absent(self.category.table(), &tx.dedup_key, &reported_record(tx))?;
        debug!(
            "{} {} {}",
            self.category,
            tx.dedup_key,
            if inserted { "recorded" } else { "already present" }
        );
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FlakyStore;
    use common::{Participant, WaiverClaim};
    use league_store::MemoryStore;
    use std::collections::BTreeMap;

    fn waiver_tx(key: &str) -> CanonicalTransaction {
        let mut assets = BTreeMap::new();
        assets.insert("0003".to_string(), vec!["Zach Ertz, PHI TE".to_string()]);
        CanonicalTransaction {
            dedup_key: key.into(),
            timestamp: 1_608_890_400,
            category: Category::Waiver,
            participants: vec![Participant {
                franchise_id: "0003".into(),
                franchise_name: "Jeff Janis Fan Club".into(),
            }],
            assets_by_participant: assets,
            claim: Some(WaiverClaim {
                bid: "$69.00".into(),
                added: "Zach Ertz, PHI TE".into(),
                dropped: None,
            }),
            raw: json!({"transaction": "11247,|69.00|", "type": "BBID_WAIVER"}),
        }
    }

    #[test]
    fn test_record_then_exists() {
        let store = MemoryStore::new();
        let dedup = DedupStore::new(&store, Category::Waiver);
        let tx = waiver_tx("1608890400-Zach-Ertz-PHI-TE");

        assert!(!dedup.exists(&tx.dedup_key).expect("exists"));
        assert!(dedup.record(&tx).expect("record"));
        assert!(dedup.exists(&tx.dedup_key).expect("exists"));
        assert!(!dedup.record(&tx).expect("record"));
        assert_eq!(store.len("waivers"), 1);
    }

    #[test]
    fn test_categories_do_not_share_keys() {
        let store = MemoryStore::new();
        DedupStore::new(&store, Category::Waiver)
            .record(&waiver_tx("1600000000"))
            .expect("record");
        assert!(!DedupStore::new(&store, Category::Trade)
            .exists("1600000000")
            .expect("exists"));
    }

    #[test]
    fn test_waiver_record_shape() {
        let r = reported_record(&waiver_tx("k"));
        assert_eq!(r["key"], json!("k"));
        assert_eq!(r["franchise_name"], json!("Jeff Janis Fan Club"));
        assert_eq!(r["raw_transaction"], json!("11247,|69.00|"));
        assert_eq!(
            r["formatted_transaction"],
            json!(["$69.00", "Zach Ertz, PHI TE", null])
        );
        assert_eq!(r["type"], json!("BBID_WAIVER"));
    }

    #[test]
    fn test_lookup_failure_is_an_error_not_unseen() {
        let store = FlakyStore {
            failing_table: Some("waivers"),
            ..FlakyStore::default()
        };
        let err = DedupStore::new(&store, Category::Waiver)
            .exists("1608890400-Zach-Ertz-PHI-TE")
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert!(err.is_transient());
    }
}
