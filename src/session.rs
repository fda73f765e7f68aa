//! Who is rating: an anonymous session or a signed-in user.
//!
//! The session is persisted under a single key. Its identifier selects which
//! preference log is read and written, so an anonymous session keeps its
//! `session-<uuid>` id across logins and logouts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{Storage, StorageError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub session_id: String,
    #[serde(default)]
    pub is_authenticated: bool,
    pub created_at: DateTime<Utc>,
}

fn new_session_id() -> String {
    format!("session-{}", uuid::Uuid::new_v4())
}

impl UserSession {
    /// A fresh anonymous session.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            session_id: new_session_id(),
            is_authenticated: false,
            created_at: Utc::now(),
        }
    }

    /// User id when signed in, else the anonymous session id.
    pub fn identifier(&self) -> &str {
        self.user_id.as_deref().unwrap_or(&self.session_id)
    }

    pub fn is_anonymous(&self) -> bool {
        !self.is_authenticated && self.user_id.is_none()
    }

    /// Stored session, or a new anonymous one which is persisted immediately.
    pub async fn load_or_create(storage: &Storage) -> Result<Self, StorageError> {
        if let Some(session) = storage.user_session().await? {
            return Ok(session);
        }
        let session = Self::anonymous();
        storage.set_user_session(&session).await?;
        tracing::debug!(session_id = %session.session_id, "Created anonymous session");
        Ok(session)
    }

    /// Attach a user id. The anonymous session id is kept.
    pub async fn migrate_to_authenticated(
        &mut self,
        storage: &Storage,
        user_id: &str,
    ) -> Result<(), StorageError> {
        self.user_id = Some(user_id.to_string());
        self.is_authenticated = true;
        storage.set_user_session(self).await
    }

    /// Drop the user id and fall back to the anonymous session id. A session
    /// that is already anonymous is left alone.
    pub async fn reset_to_anonymous(&mut self, storage: &Storage) -> Result<(), StorageError> {
        if self.is_anonymous() {
            return Ok(());
        }
        self.user_id = None;
        self.is_authenticated = false;
        storage.set_user_session(self).await
    }

    /// Forget the stored session and start a new anonymous one.
    pub async fn clear(storage: &Storage) -> Result<Self, StorageError> {
        storage.clear_user_session().await?;
        Self::load_or_create(storage).await
    }
}
