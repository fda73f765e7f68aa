//! Typed accessors over the key-value store, one per logical key.
//!
//! Reads degrade: a value that no longer parses is logged and treated as
//! absent, so a corrupt entry never blocks startup.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::kv::KeyValueStore;
use super::types::StorageError;
use crate::catalog::MovieId;
use crate::preferences::PreferenceLog;
use crate::session::UserSession;
use crate::social::User;

pub const AUTH_TOKEN_KEY: &str = "auth-token";
pub const AUTH_USER_KEY: &str = "auth-user";
pub const USER_SESSION_KEY: &str = "user-session";
const PREFERENCES_KEY_PREFIX: &str = "user-preferences:";
pub const MOVIE_DURATIONS_KEY: &str = "movie-durations";

pub fn preferences_key(identifier: &str) -> String {
    format!("{PREFERENCES_KEY_PREFIX}{identifier}")
}

/// Movie id → runtime in minutes. Grows without eviction.
pub type DurationCache = BTreeMap<u64, u32>;

#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write of the duration cache
    durations_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            durations_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Storage over a fresh [`MemoryStore`](super::MemoryStore).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(super::MemoryStore::new()))
    }

    pub fn raw(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Stored value is corrupt, ignoring");
                Ok(None)
            }
        }
    }

    async fn write_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, &raw).await
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub async fn auth_token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .store
            .get(AUTH_TOKEN_KEY)
            .await?
            .filter(|t| !t.is_empty())
            .map(SecretString::from))
    }

    pub async fn set_auth_token(&self, token: &SecretString) -> Result<(), StorageError> {
        self.store.set(AUTH_TOKEN_KEY, token.expose_secret()).await
    }

    pub async fn auth_user(&self) -> Result<Option<User>, StorageError> {
        self.read_json(AUTH_USER_KEY).await
    }

    pub async fn set_auth_user(&self, user: &User) -> Result<(), StorageError> {
        self.write_json(AUTH_USER_KEY, user).await
    }

    /// Remove both the token and the cached user.
    pub async fn clear_auth(&self) -> Result<(), StorageError> {
        self.store.remove(AUTH_TOKEN_KEY).await?;
        self.store.remove(AUTH_USER_KEY).await
    }

    // ========================================================================
    // Session
    // ========================================================================

    pub async fn user_session(&self) -> Result<Option<UserSession>, StorageError> {
        self.read_json(USER_SESSION_KEY).await
    }

    pub async fn set_user_session(&self, session: &UserSession) -> Result<(), StorageError> {
        self.write_json(USER_SESSION_KEY, session).await
    }

    pub async fn clear_user_session(&self) -> Result<(), StorageError> {
        self.store.remove(USER_SESSION_KEY).await
    }

    // ========================================================================
    // Preference Logs
    // ========================================================================

    pub async fn preference_log(
        &self,
        identifier: &str,
    ) -> Result<Option<PreferenceLog>, StorageError> {
        self.read_json(&preferences_key(identifier)).await
    }

    pub async fn set_preference_log(
        &self,
        identifier: &str,
        log: &PreferenceLog,
    ) -> Result<(), StorageError> {
        self.write_json(&preferences_key(identifier), log).await
    }

    pub async fn remove_preference_log(&self, identifier: &str) -> Result<(), StorageError> {
        self.store.remove(&preferences_key(identifier)).await
    }

    // ========================================================================
    // Duration Cache
    // ========================================================================

    pub async fn movie_durations(&self) -> Result<DurationCache, StorageError> {
        Ok(self
            .read_json(MOVIE_DURATIONS_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn duration_for(&self, id: MovieId) -> Result<Option<u32>, StorageError> {
        Ok(self.movie_durations().await?.get(&id.get()).copied())
    }

    /// Persist one runtime. Concurrent callers in this process never lose
    /// each other's entries.
    pub async fn record_duration(&self, id: MovieId, minutes: u32) -> Result<(), StorageError> {
        let _guard = self.durations_lock.lock().await;
        let mut cache = self.movie_durations().await?;
        cache.insert(id.get(), minutes);
        self.write_json(MOVIE_DURATIONS_KEY, &cache).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    #[tokio::test]
    async fn test_auth_token_round_trip() {
        let storage = Storage::in_memory();
        assert!(storage.auth_token().await.unwrap().is_none());

        storage
            .set_auth_token(&SecretString::from("jwt-abc"))
            .await
            .unwrap();
        let token = storage.auth_token().await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "jwt-abc");

        storage.clear_auth().await.unwrap();
        assert!(storage.auth_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_value_reads_as_absent() {
        let storage = Storage::in_memory();
        storage.raw().set(USER_SESSION_KEY, "{not json").await.unwrap();
        assert!(storage.user_session().await.unwrap().is_none());

        storage.raw().set(MOVIE_DURATIONS_KEY, "[]").await.unwrap();
        assert!(storage.movie_durations().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_duration_concurrent_writers_keep_all_entries() {
        let db = Database::open(":memory:").await.unwrap();
        let storage = Storage::new(Arc::new(db));

        let mut handles = Vec::new();
        for id in 1..=20u64 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                storage.record_duration(MovieId::new(id), 90 + id as u32).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let cache = storage.movie_durations().await.unwrap();
        assert_eq!(cache.len(), 20);
        assert_eq!(storage.duration_for(MovieId::new(7)).await.unwrap(), Some(97));
    }
}
