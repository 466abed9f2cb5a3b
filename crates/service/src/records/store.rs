use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::errors::ServiceError;
use crate::storage::json_array_store::JsonArrayStore;

use super::identity::{assign_identity, backend_id, force_identity};
use super::Record;

/// Trait abstraction for record storage.
/// Implementations can be file-backed, database-backed, or remote.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records in stored order, each with identity fields filled in.
    async fn list(&self) -> Result<Vec<Record>, ServiceError>;
    /// Append a new record and return it as stored.
    async fn create(&self, payload: Record) -> Result<Record, ServiceError>;
    /// Replace the record identified by `backend_id` in full.
    async fn update(&self, backend_id: &str, payload: Record) -> Result<Record, ServiceError>;
    /// Remove the record identified by `backend_id`.
    async fn delete(&self, backend_id: &str) -> Result<(), ServiceError>;
}

/// Records persisted as a single JSON array file.
pub struct FileRecordStore {
    store: JsonArrayStore<Record>,
}

impl FileRecordStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { store: JsonArrayStore::new(path) }
    }

    /// Raw collection as persisted, without identity defaults applied.
    pub async fn load(&self) -> Result<Vec<Record>, ServiceError> {
        self.store.read().await
    }

    /// Overwrite the whole collection.
    pub async fn save(&self, records: Vec<Record>) -> Result<(), ServiceError> {
        self.store.write(&records).await
    }
}

/// Index of the first record whose `__backendId` equals `id`.
fn position_of(records: &[Record], id: &str) -> Option<usize> {
    let mut matches = records
        .iter()
        .enumerate()
        .filter(|(_, r)| backend_id(r).as_deref() == Some(id))
        .map(|(i, _)| i);
    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        warn!(backend_id = %id, duplicates = extra + 1, "duplicate backend ids in store; using first match");
    }
    Some(first)
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn list(&self) -> Result<Vec<Record>, ServiceError> {
        let mut records = self.store.read().await?;
        for r in records.iter_mut() {
            assign_identity(r);
        }
        debug!(count = records.len(), "listed records");
        Ok(records)
    }

    async fn create(&self, mut payload: Record) -> Result<Record, ServiceError> {
        let id = assign_identity(&mut payload);
        let stored = payload.clone();
        self.store
            .update(move |records| {
                records.push(payload);
                Ok(())
            })
            .await?;
        info!(backend_id = %id, "record created");
        Ok(stored)
    }

    async fn update(&self, id: &str, mut payload: Record) -> Result<Record, ServiceError> {
        force_identity(&mut payload, id);
        let stored = payload.clone();
        self.store
            .update(|records| {
                let idx = position_of(records, id).ok_or_else(|| ServiceError::not_found("record"))?;
                records[idx] = payload;
                Ok(())
            })
            .await?;
        info!(backend_id = %id, "record replaced");
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.store
            .update(|records| {
                let idx = position_of(records, id).ok_or_else(|| ServiceError::not_found("record"))?;
                records.remove(idx);
                Ok(())
            })
            .await?;
        info!(backend_id = %id, "record deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use serde_json::{json, Value};

    fn rec(v: Value) -> Record {
        match v {
            Value::Object(m) => m,
            _ => panic!("test record must be an object"),
        }
    }

    fn tmp_store() -> (FileRecordStore, PathBuf) {
        let path = std::env::temp_dir().join(format!("record_store_{}.json", uuid::Uuid::new_v4()));
        (FileRecordStore::new(&path), path)
    }

    fn ids(records: &[Record]) -> Vec<String> {
        records.iter().filter_map(backend_id).collect()
    }

    #[tokio::test]
    async fn create_on_empty_store() -> Result<(), anyhow::Error> {
        let (store, path) = tmp_store();
        assert!(store.list().await?.is_empty());

        let created = store.create(rec(json!({"name": "a"}))).await?;
        let id = backend_id(&created).expect("backend id");
        assert!(!id.is_empty());
        assert_eq!(Value::Object(created.clone()), json!({"name": "a", "__backendId": id, "id": id}));

        let listed = store.list().await?;
        assert_eq!(listed, vec![created]);

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_whole_record() -> Result<(), anyhow::Error> {
        let (store, path) = tmp_store();
        store.create(rec(json!({"id": "r1", "name": "a", "extra": true}))).await?;

        let updated = store.update("r1", rec(json!({"name": "b", "__backendId": "spoofed"}))).await?;
        assert_eq!(Value::Object(updated), json!({"name": "b", "__backendId": "r1", "id": "r1"}));

        let listed = store.list().await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(Value::Object(listed[0].clone()), json!({"name": "b", "__backendId": "r1", "id": "r1"}));

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_keeps_client_supplied_id() -> Result<(), anyhow::Error> {
        let (store, path) = tmp_store();
        store.create(rec(json!({"id": "r1"}))).await?;
        let updated = store.update("r1", rec(json!({"id": "custom"}))).await?;
        assert_eq!(updated["__backendId"], "r1");
        assert_eq!(updated["id"], "custom");
        // the record is still addressed by its backend id
        store.delete("r1").await?;
        assert!(store.list().await?.is_empty());
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_first_match_and_keeps_order() -> Result<(), anyhow::Error> {
        let (store, path) = tmp_store();
        store
            .save(vec![
                rec(json!({"__backendId": "a", "n": 1})),
                rec(json!({"__backendId": "b", "n": 2})),
                rec(json!({"__backendId": "c", "n": 3})),
                rec(json!({"__backendId": "b", "n": 4})),
            ])
            .await?;

        store.delete("b").await?;
        let listed = store.list().await?;
        assert_eq!(ids(&listed), vec!["a", "c", "b"]);
        assert_eq!(listed[2]["n"], 4);

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_and_changes_nothing() -> Result<(), anyhow::Error> {
        let (store, path) = tmp_store();
        store.create(rec(json!({"id": "r1", "name": "a"}))).await?;
        let before = tokio::fs::read(&path).await?;

        assert!(matches!(store.update("nope", Record::new()).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(store.delete("nope").await, Err(ServiceError::NotFound(_))));

        assert_eq!(tokio::fs::read(&path).await?, before);
        assert_eq!(ids(&store.list().await?), vec!["r1"]);

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn list_fills_identity_without_persisting() -> Result<(), anyhow::Error> {
        let (store, path) = tmp_store();
        tokio::fs::write(&path, br#"[{"id": "legacy"}, {"__backendId": "b2"}]"#).await?;

        let listed = store.list().await?;
        assert_eq!(Value::Object(listed[0].clone()), json!({"id": "legacy", "__backendId": "legacy"}));
        assert_eq!(Value::Object(listed[1].clone()), json!({"__backendId": "b2", "id": "b2"}));

        // nothing written back by a read
        let raw = store.load().await?;
        assert!(!raw[0].contains_key("__backendId"));
        assert!(!raw[1].contains_key("id"));

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() -> Result<(), anyhow::Error> {
        let (store, path) = tmp_store();
        tokio::fs::write(&path, b"not json at all").await?;
        assert!(matches!(store.list().await, Err(ServiceError::Storage(_))));
        assert!(matches!(store.create(Record::new()).await, Err(ServiceError::Storage(_))));
        // the corrupt file is left as it was
        assert_eq!(tokio::fs::read(&path).await?, b"not json at all");
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn load_save_round_trip() -> Result<(), anyhow::Error> {
        let (store, path) = tmp_store();
        for name in ["x", "y", "z"] {
            store.create(rec(json!({"name": name}))).await?;
        }
        let before = store.load().await?;
        store.save(before.clone()).await?;
        assert_eq!(store.load().await?, before);
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_are_not_lost() -> Result<(), anyhow::Error> {
        let (store, path) = tmp_store();
        let store = Arc::new(store);
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.create(rec(json!({"n": i}))).await }));
        }
        for h in handles {
            h.await??;
        }
        assert_eq!(store.list().await?.len(), 20);
        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }
}
