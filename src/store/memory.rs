use std::collections::HashMap;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Document, DocumentStore, Filter, SnapshotStream};

struct Watcher {
    collection: String,
    filters: Vec<Filter>,
    tx: mpsc::UnboundedSender<Vec<Document>>,
}

/// In-memory [`DocumentStore`] backing the test suite and embedders that do
/// not need a remote store. Collections keep insertion order, ids are v4
/// uuids, and every mutation pushes a fresh snapshot to live subscribers.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    watchers: RwLock<Vec<Watcher>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn publish(&self, collection: &str) {
        let docs = {
            let collections = self.collections.read().await;
            collections.get(collection).cloned().unwrap_or_default()
        };
        let mut watchers = self.watchers.write().await;
        watchers.retain(|w| !w.tx.is_closed());
        for watcher in watchers.iter().filter(|w| w.collection == collection) {
            let _ = watcher
                .tx
                .unbounded_send(filter_docs(&docs, &watcher.filters));
        }
    }
}

fn filter_docs(docs: &[Document], filters: &[Filter]) -> Vec<Document> {
    docs.iter()
        .filter(|doc| filters.iter().all(|f| f.matches(&doc.fields)))
        .cloned()
        .collect()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, fields: Value) -> Result<String> {
        if !fields.is_object() {
            return Err(anyhow!("document body must be a JSON object"));
        }
        let id = Uuid::new_v4().to_string();
        {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .push(Document {
                    id: id.clone(),
                    fields,
                });
        }
        self.publish(collection).await;
        Ok(id)
    }

    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| filter_docs(docs, filters))
            .unwrap_or_default())
    }

    async fn update_partial(&self, collection: &str, id: &str, patch: Value) -> Result<()> {
        let Value::Object(patch) = patch else {
            return Err(anyhow!("patch must be a JSON object"));
        };
        {
            let mut collections = self.collections.write().await;
            let doc = collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                .ok_or_else(|| anyhow!("no document {id} in {collection}"))?;
            let fields = doc
                .fields
                .as_object_mut()
                .ok_or_else(|| anyhow!("document {id} is not an object"))?;
            for (key, value) in patch {
                fields.insert(key, value);
            }
        }
        self.publish(collection).await;
        Ok(())
    }

    async fn subscribe(&self, collection: &str, filters: Vec<Filter>) -> Result<SnapshotStream> {
        let (tx, rx) = mpsc::unbounded();
        let initial = {
            let collections = self.collections.read().await;
            collections
                .get(collection)
                .map(|docs| filter_docs(docs, &filters))
                .unwrap_or_default()
        };
        let _ = tx.unbounded_send(initial);
        self.watchers.write().await.push(Watcher {
            collection: collection.to_string(),
            filters,
            tx,
        });
        Ok(rx.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_assigns_distinct_ids_and_keeps_insertion_order() {
        let store = MemoryStore::new();
        let first = store
            .create("leaves", json!({ "status": "pending_admin" }))
            .await
            .unwrap();
        let second = store
            .create("leaves", json!({ "status": "pending_teacher" }))
            .await
            .unwrap();
        assert_ne!(first, second);

        let docs = store.query("leaves", &[]).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, first);
        assert_eq!(docs[1].id, second);
    }

    #[tokio::test]
    async fn query_applies_equality_and_range_filters_together() {
        let store = MemoryStore::new();
        store
            .create("leaves", json!({ "status": "approved", "start_date": "2024-05-01" }))
            .await
            .unwrap();
        store
            .create("leaves", json!({ "status": "approved", "start_date": "2024-06-10" }))
            .await
            .unwrap();
        store
            .create("leaves", json!({ "status": "rejected", "start_date": "2024-05-02" }))
            .await
            .unwrap();

        let docs = store
            .query(
                "leaves",
                &[
                    Filter::eq("status", "approved"),
                    Filter::gte("start_date", "2024-05-01"),
                    Filter::lte("start_date", "2024-05-31"),
                ],
            )
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].fields["start_date"], "2024-05-01");
    }

    #[tokio::test]
    async fn update_partial_merges_fields_and_rejects_unknown_ids() {
        let store = MemoryStore::new();
        let id = store
            .create("leaves", json!({ "status": "pending_teacher", "reason": "fever" }))
            .await
            .unwrap();

        store
            .update_partial("leaves", &id, json!({ "status": "rejected", "teacher_remark": "overlaps exams" }))
            .await
            .unwrap();

        let doc = store.fetch("leaves", &id).await.unwrap().unwrap();
        assert_eq!(doc.fields["status"], "rejected");
        assert_eq!(doc.fields["reason"], "fever");
        assert_eq!(doc.fields["teacher_remark"], "overlaps exams");

        let err = store
            .update_partial("leaves", "missing", json!({ "status": "approved" }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[tokio::test]
    async fn subscribe_emits_the_current_snapshot_then_one_per_mutation() {
        let store = MemoryStore::new();
        store
            .create("leaves", json!({ "status": "pending_admin" }))
            .await
            .unwrap();

        let mut snapshots = store
            .subscribe("leaves", vec![Filter::eq("status", "pending_admin")])
            .await
            .unwrap();
        assert_eq!(snapshots.next().await.unwrap().len(), 1);

        let id = store
            .create("leaves", json!({ "status": "pending_admin" }))
            .await
            .unwrap();
        assert_eq!(snapshots.next().await.unwrap().len(), 2);

        store
            .update_partial("leaves", &id, json!({ "status": "approved" }))
            .await
            .unwrap();
        assert_eq!(snapshots.next().await.unwrap().len(), 1);
    }
}
