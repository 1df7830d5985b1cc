use crate::{CoreError, Document, DocumentStore};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// A typed record stored as one document in its own collection.
///
/// `Draft` is the create payload (everything except id and timestamps) and
/// `Patch` the partial update payload.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Document fields a listing may be filtered on.
    const FILTERS: &'static [&'static str];

    type Draft: Serialize + DeserializeOwned + Send + Sync + 'static;
    type Patch: Serialize + DeserializeOwned + Send + Sync + 'static;

    fn id(&self) -> &str;

    /// The branch whose dashboard this record feeds, if any.
    fn branch_scope(&self) -> Option<&str>;

    fn draft_branch_scope(draft: &Self::Draft) -> Option<&str>;

    /// Reject patches that are not legal against the current record.
    fn check_patch(&self, _patch: &Self::Patch) -> Result<(), CoreError> {
        Ok(())
    }
}

/// CRUD access to one collection, mapping documents to `E`.
pub struct EntityRepository<E> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> EntityRepository<E> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub async fn get_all(&self) -> Result<Vec<E>, CoreError> {
        self.store
            .list(E::COLLECTION)
            .await?
            .into_iter()
            .map(hydrate)
            .collect()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<E>, CoreError> {
        self.store
            .get(E::COLLECTION, id)
            .await?
            .map(hydrate)
            .transpose()
    }

    pub async fn get_by_filter(
        &self,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<E>, CoreError> {
        let value = value.into();
        self.store
            .list_where(E::COLLECTION, field, &value)
            .await?
            .into_iter()
            .map(hydrate)
            .collect()
    }

    /// Store a new record and return its generated id.
    pub async fn create(&self, draft: &E::Draft) -> Result<String, CoreError> {
        let id = self.store.create(E::COLLECTION, to_fields(draft)?).await?;
        debug!("created {}/{}", E::COLLECTION, id);
        Ok(id)
    }

    /// Store a record under a known id (used for seeding).
    pub async fn put(&self, id: &str, draft: &E::Draft) -> Result<(), CoreError> {
        self.store.set(E::COLLECTION, id, to_fields(draft)?).await
    }

    /// Apply a partial update. The current record is read first so the patch
    /// can be checked against it; the write itself is last-write-wins.
    pub async fn update(&self, id: &str, patch: &E::Patch) -> Result<(), CoreError> {
        let current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("{}/{}", E::COLLECTION, id)))?;
        current.check_patch(patch)?;
        self.store.update(E::COLLECTION, id, to_fields(patch)?).await?;
        debug!("updated {}/{}", E::COLLECTION, id);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.store.delete(E::COLLECTION, id).await?;
        debug!("deleted {}/{}", E::COLLECTION, id);
        Ok(())
    }
}

/// Turn a stored document into a typed record.
pub fn hydrate<E: Entity>(document: Document) -> Result<E, CoreError> {
    let Document {
        id,
        mut fields,
        created_at,
        updated_at,
    } = document;
    let decode_error =
        |e: serde_json::Error| CoreError::Deserialization(format!("{}/{}: {}", E::COLLECTION, id, e));

    fields.insert("createdAt".into(), serde_json::to_value(created_at).map_err(decode_error)?);
    fields.insert("updatedAt".into(), serde_json::to_value(updated_at).map_err(decode_error)?);
    fields.insert("id".into(), Value::String(id.clone()));
    serde_json::from_value(Value::Object(fields)).map_err(decode_error)
}

fn to_fields<T: Serialize>(payload: &T) -> Result<Map<String, Value>, CoreError> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(CoreError::Serialization(format!(
            "expected an object payload, got {other}"
        ))),
        Err(e) => Err(CoreError::Serialization(e.to_string())),
    }
}

/// Deserialize a patch field where an explicit `null` means "clear it":
/// absent => `None`, `null` => `Some(None)`, value => `Some(Some(value))`.
pub(crate) fn clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
