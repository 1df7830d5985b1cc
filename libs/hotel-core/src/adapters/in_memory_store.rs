use crate::{CoreError, Document, DocumentStore};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory implementation of the DocumentStore port for testing and single-executable mode.
/// Documents are grouped per collection and keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    // Store: Collection -> (Document ID -> Document)
    collections: Arc<DashMap<String, HashMap<String, Document>>>,
}

impl InMemoryDocumentStore {
    fn collect<F>(&self, collection: &str, keep: F) -> Vec<Document>
    where
        F: Fn(&Document) -> bool,
    {
        let mut documents: Vec<Document> = match self.collections.get(collection) {
            Some(entry) => entry.values().filter(|doc| keep(doc)).cloned().collect(),
            None => Vec::new(),
        };
        // HashMap order is arbitrary; keep listings stable for callers that render them.
        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        documents
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, CoreError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|entry| entry.get(id).cloned()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, CoreError> {
        Ok(self.collect(collection, |_| true))
    }

    async fn list_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, CoreError> {
        Ok(self.collect(collection, |doc| doc.fields.get(field) == Some(value)))
    }

    async fn create(
        &self,
        collection: &str,
        fields: Map<String, Value>,
    ) -> Result<String, CoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(
                id.clone(),
                Document {
                    id: id.clone(),
                    fields,
                    created_at: now,
                    updated_at: now,
                },
            );
        Ok(id)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), CoreError> {
        let now = Utc::now();
        let mut entry = self.collections.entry(collection.to_string()).or_default();
        let created_at = entry.get(id).map_or(now, |existing| existing.created_at);
        entry.insert(
            id.to_string(),
            Document {
                id: id.to_string(),
                fields,
                created_at,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<(), CoreError> {
        let mut entry = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| CoreError::NotFound(format!("{collection}/{id}")))?;
        let document = entry
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(format!("{collection}/{id}")))?;

        // Shallow merge, last write wins
        for (field, value) in patch {
            document.fields.insert(field, value);
        }
        document.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), CoreError> {
        if let Some(mut entry) = self.collections.get_mut(collection) {
            entry.remove(id);
        }
        Ok(())
    }
}
