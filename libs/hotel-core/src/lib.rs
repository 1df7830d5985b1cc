use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::error::Error as StdError;

// Declare modules
pub mod adapters;
pub mod dashboard;
pub mod demo;
pub mod domain;
pub mod views;

pub use domain::Hotel;

// Common error type for the core library
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("Infrastructure error: {0}")]
    Infrastructure(#[from] Box<dyn StdError + Send + Sync>),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A document as held by the remote store: its key, its attribute fields and
/// the timestamps the store keeps for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Port for the document database holding one collection per entity type
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document. A missing document is `Ok(None)`.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, CoreError>;

    /// Fetch every document of a collection. No ordering is guaranteed.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, CoreError>;

    /// Fetch the documents whose top-level `field` equals `value`.
    async fn list_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, CoreError>;

    /// Insert a document under a generated id, stamping both timestamps.
    async fn create(&self, collection: &str, fields: Map<String, Value>)
        -> Result<String, CoreError>;

    /// Write a document under a caller-chosen id, replacing any previous fields.
    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), CoreError>;

    /// Shallow-merge `patch` into an existing document and stamp `updated_at`.
    /// Fails with `CoreError::NotFound` when the document does not exist.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<(), CoreError>;

    /// Hard delete. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), CoreError>;
}

// Port for caching data
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError>;
    async fn set(&self, key: &str, value: &[u8], ttl_seconds: Option<u64>)
        -> Result<(), CoreError>;
    async fn delete(&self, key: &str) -> Result<(), CoreError>;
}
