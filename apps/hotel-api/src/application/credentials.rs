use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use hotel_core::{CoreError, DocumentStore, demo};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Password hashes are kept apart from user records, keyed by user id, so
/// the user routes never serve them.
pub const CREDENTIALS_COLLECTION: &str = "credentials";

const HASH_FIELD: &str = "passwordHash";

/// Argon2id PHC string for `password` under a fresh random salt.
pub async fn hash_password(password: &str) -> Result<String, CoreError> {
    let password = password.to_owned();
    // Hashing is CPU-bound; keep it off the async workers
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())
            .map_err(|e| CoreError::Internal(format!("salt encoding failed: {e}")))?;
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CoreError::Internal(format!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| CoreError::Internal(format!("hashing task failed: {e}")))?
}

#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn DocumentStore>,
}

impl Credentials {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn set_password(&self, user_id: &str, password: &str) -> Result<(), CoreError> {
        let hash = hash_password(password).await?;
        self.set_hash(user_id, hash).await
    }

    async fn set_hash(&self, user_id: &str, hash: String) -> Result<(), CoreError> {
        let mut fields = Map::new();
        fields.insert(HASH_FIELD.into(), Value::String(hash));
        self.store.set(CREDENTIALS_COLLECTION, user_id, fields).await
    }

    /// `false` for a wrong password and for accounts that never got one.
    pub async fn verify(&self, user_id: &str, password: &str) -> Result<bool, CoreError> {
        let Some(doc) = self.store.get(CREDENTIALS_COLLECTION, user_id).await? else {
            return Ok(false);
        };
        let Some(stored) = doc.fields.get(HASH_FIELD).and_then(Value::as_str) else {
            warn!("Credentials for {} carry no password hash", user_id);
            return Ok(false);
        };

        let stored = stored.to_owned();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&stored)
                .map_err(|e| CoreError::Internal(format!("unreadable password hash: {e}")))?;
            Ok::<_, CoreError>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
            )
        })
        .await
        .map_err(|e| CoreError::Internal(format!("verification task failed: {e}")))?
    }

    pub async fn forget(&self, user_id: &str) -> Result<(), CoreError> {
        self.store.delete(CREDENTIALS_COLLECTION, user_id).await
    }

    /// Give every bundled account the demo password.
    pub async fn seed_demo(&self) -> Result<(), CoreError> {
        // One hash serves all demo accounts
        let hash = hash_password(demo::DEMO_PASSWORD).await?;
        let accounts = demo::account_ids();
        for id in &accounts {
            self.set_hash(id, hash.clone()).await?;
        }
        info!("Seeded demo credentials for {} accounts", accounts.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotel_core::adapters::InMemoryDocumentStore;

    fn credentials() -> Credentials {
        Credentials::new(Arc::new(InMemoryDocumentStore::default()))
    }

    #[tokio::test]
    async fn test_verify_matches_only_the_set_password() {
        let credentials = credentials();
        credentials.set_password("u-1", "correct horse").await.unwrap();

        assert!(credentials.verify("u-1", "correct horse").await.unwrap());
        assert!(!credentials.verify("u-1", "wrong").await.unwrap());
        assert!(!credentials.verify("u-2", "correct horse").await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let a = hash_password("same").await.unwrap();
        let b = hash_password("same").await.unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_forget_removes_the_password() {
        let credentials = credentials();
        credentials.set_password("u-1", "secret").await.unwrap();
        credentials.forget("u-1").await.unwrap();
        assert!(!credentials.verify("u-1", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn test_demo_accounts_share_the_demo_password() {
        let credentials = credentials();
        credentials.seed_demo().await.unwrap();
        for id in demo::account_ids() {
            assert!(credentials.verify(&id, demo::DEMO_PASSWORD).await.unwrap());
        }
    }
}
