//! Per-user movie preference log.
//!
//! Each swipe appends one entry. The log is stored under
//! `user-preferences:<identifier>` where the identifier comes from the
//! current [`UserSession`](crate::session::UserSession), so an anonymous
//! session and each signed-in user keep separate logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Movie, MovieId};
use crate::gesture::Rating;
use crate::storage::{Storage, StorageError};

// ============================================================================
// Persisted Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePreference {
    pub movie_id: MovieId,
    pub title: String,
    pub rating: Rating,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceLog {
    /// Identifier the log belongs to (user id or anonymous session id)
    pub session_id: String,
    #[serde(default)]
    pub preferences: Vec<MoviePreference>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PreferenceLog {
    pub fn new(identifier: &str) -> Self {
        let now = Utc::now();
        Self {
            session_id: identifier.to_string(),
            preferences: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn len(&self) -> usize {
        self.preferences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty()
    }

    /// Most recent rating given to a movie.
    pub fn latest_rating(&self, id: MovieId) -> Option<Rating> {
        self.preferences
            .iter()
            .rev()
            .find(|p| p.movie_id == id)
            .map(|p| p.rating)
    }

    pub fn count(&self, rating: Rating) -> usize {
        self.preferences.iter().filter(|p| p.rating == rating).count()
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// Preference log bound to one identifier, written through on every change.
#[derive(Debug, Clone)]
pub struct Preferences {
    storage: Storage,
    log: PreferenceLog,
}

impl Preferences {
    pub async fn load(storage: Storage, identifier: &str) -> Result<Self, StorageError> {
        let log = storage
            .preference_log(identifier)
            .await?
            .unwrap_or_else(|| PreferenceLog::new(identifier));
        Ok(Self { storage, log })
    }

    pub fn identifier(&self) -> &str {
        &self.log.session_id
    }

    pub fn log(&self) -> &PreferenceLog {
        &self.log
    }

    /// Switch to another identifier's log (after sign-in or sign-out).
    pub async fn switch_to(&mut self, identifier: &str) -> Result<(), StorageError> {
        if self.identifier() == identifier {
            return Ok(());
        }
        self.log = self
            .storage
            .preference_log(identifier)
            .await?
            .unwrap_or_else(|| PreferenceLog::new(identifier));
        tracing::debug!(identifier, entries = self.log.len(), "Switched preference log");
        Ok(())
    }

    /// Record a rating. Repeat ratings of the same movie are kept.
    pub async fn add(&mut self, movie: &Movie, rating: Rating) -> Result<(), StorageError> {
        let mut updated = self.log.clone();
        let now = Utc::now();
        updated.preferences.push(MoviePreference {
            movie_id: movie.id,
            title: movie.title.clone(),
            rating,
            timestamp: now,
        });
        updated.updated_at = now;

        self.storage
            .set_preference_log(&updated.session_id, &updated)
            .await?;
        tracing::debug!(movie_id = %movie.id, rating = %rating, "Preference recorded");
        self.log = updated;
        Ok(())
    }

    /// Remove the entry for `id` recorded at `timestamp`. Returns whether one
    /// was found.
    pub async fn remove(
        &mut self,
        id: MovieId,
        timestamp: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        let mut updated = self.log.clone();
        let before = updated.preferences.len();
        updated
            .preferences
            .retain(|p| !(p.movie_id == id && p.timestamp == timestamp));
        if updated.preferences.len() == before {
            return Ok(false);
        }
        updated.updated_at = Utc::now();

        self.storage
            .set_preference_log(&updated.session_id, &updated)
            .await?;
        self.log = updated;
        Ok(true)
    }

    /// Drop the stored log and start an empty one.
    pub async fn clear(&mut self) -> Result<(), StorageError> {
        let identifier = self.log.session_id.clone();
        self.storage.remove_preference_log(&identifier).await?;
        self.log = PreferenceLog::new(&identifier);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fallback_movies;

    #[tokio::test]
    async fn test_add_persists() {
        let storage = Storage::in_memory();
        let movies = fallback_movies();
        let mut prefs = Preferences::load(storage.clone(), "session-a").await.unwrap();

        prefs.add(&movies[0], Rating::SeenLiked).await.unwrap();
        prefs.add(&movies[1], Rating::NotSeenDisliked).await.unwrap();

        let reloaded = Preferences::load(storage, "session-a").await.unwrap();
        assert_eq!(reloaded.log().len(), 2);
        assert_eq!(
            reloaded.log().latest_rating(movies[1].id),
            Some(Rating::NotSeenDisliked)
        );
    }

    #[tokio::test]
    async fn test_logs_are_per_identifier() {
        let storage = Storage::in_memory();
        let movies = fallback_movies();
        let mut prefs = Preferences::load(storage.clone(), "session-a").await.unwrap();
        prefs.add(&movies[0], Rating::SeenLiked).await.unwrap();

        prefs.switch_to("user-1").await.unwrap();
        assert!(prefs.log().is_empty());
        prefs.add(&movies[2], Rating::SeenDisliked).await.unwrap();

        prefs.switch_to("session-a").await.unwrap();
        assert_eq!(prefs.log().len(), 1);
        assert_eq!(prefs.log().preferences[0].movie_id, movies[0].id);
    }

    #[tokio::test]
    async fn test_remove_matches_id_and_timestamp() {
        let storage = Storage::in_memory();
        let movies = fallback_movies();
        let mut prefs = Preferences::load(storage, "s").await.unwrap();
        prefs.add(&movies[0], Rating::SeenLiked).await.unwrap();
        prefs.add(&movies[0], Rating::SeenDisliked).await.unwrap();

        let first = prefs.log().preferences[0].timestamp;
        assert!(!prefs.remove(movies[1].id, first).await.unwrap());
        assert!(prefs.remove(movies[0].id, first).await.unwrap());
        assert_eq!(prefs.log().len(), 1);
        assert_eq!(prefs.log().count(Rating::SeenDisliked), 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let storage = Storage::in_memory();
        let movies = fallback_movies();
        let mut prefs = Preferences::load(storage.clone(), "s").await.unwrap();
        prefs.add(&movies[3], Rating::NotSeenLiked).await.unwrap();
        prefs.clear().await.unwrap();

        assert!(prefs.log().is_empty());
        assert!(storage.preference_log("s").await.unwrap().is_none());
    }

    #[test]
    fn test_wire_format() {
        let entry = MoviePreference {
            movie_id: MovieId::new(680),
            title: "Pulp Fiction".to_string(),
            rating: Rating::NotSeenLiked,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["movieId"], 680);
        assert_eq!(json["rating"], "not-seen-liked");
    }
}
