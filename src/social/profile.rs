//! Own-profile state, user search and profile date helpers.

use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;

use super::client::SocialClient;
use super::types::{UpdateProfile, UserProfile, UserSearchResult};
use crate::remote::RemoteError;
use crate::validation::{self, ProfileFields, ValidationError};

pub const DEFAULT_SEARCH_PAGE_SIZE: u32 = 10;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{}", join_messages(.0))]
    Validation(Vec<ValidationError>),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Default)]
pub struct ProfileState {
    profile: Option<UserProfile>,
    error: Option<String>,
}

impl ProfileState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear(&mut self) {
        self.profile = None;
        self.error = None;
    }

    pub async fn load(&mut self, client: &SocialClient) -> Result<&UserProfile, RemoteError> {
        self.error = None;
        match client.my_profile().await {
            Ok(profile) => Ok(self.profile.insert(profile)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load profile");
                self.error = Some("Failed to load profile".to_string());
                Err(e)
            }
        }
    }

    /// Validate locally, then send. The cached profile is replaced only on
    /// success.
    pub async fn update(
        &mut self,
        client: &SocialClient,
        update: &UpdateProfile,
    ) -> Result<&UserProfile, ProfileError> {
        self.error = None;
        let errors = validation::validate_profile(ProfileFields {
            username: None,
            display_name: update.display_name.as_deref(),
            bio: update.bio.as_deref(),
        });
        if !errors.is_empty() {
            let err = ProfileError::Validation(errors);
            self.error = Some(err.to_string());
            return Err(err);
        }

        match client.update_profile(update).await {
            Ok(profile) => {
                tracing::info!("Profile updated");
                Ok(self.profile.insert(profile))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to update profile");
                self.error = Some("Failed to update profile".to_string());
                Err(e.into())
            }
        }
    }

    /// Upload a new avatar and patch the cached profile with its URL.
    pub async fn upload_avatar(
        &mut self,
        client: &SocialClient,
        path: &Path,
    ) -> Result<String, RemoteError> {
        self.error = None;
        match client.upload_avatar(path).await {
            Ok(url) => {
                if let Some(profile) = self.profile.as_mut() {
                    profile.avatar_url = Some(url.clone());
                }
                Ok(url)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to upload avatar");
                self.error = Some("Failed to upload avatar".to_string());
                Err(e)
            }
        }
    }
}

/// Search users; any failure yields an empty result.
pub async fn search_users(
    client: &SocialClient,
    query: &str,
    page: u32,
    size: u32,
) -> UserSearchResult {
    let query = query.trim();
    if query.is_empty() {
        return UserSearchResult::default();
    }
    client
        .search_users(query, page, size)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, query, "User search failed");
            UserSearchResult::default()
        })
}

/// Whole days between two instants, rounded up.
pub fn days_since(date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (now - date).num_seconds().abs();
    (seconds + 86_399) / 86_400
}

/// "Joined 12 days ago" style label for a profile.
pub fn joined_label(profile: &UserProfile, now: DateTime<Utc>) -> String {
    match days_since(profile.joined_date, now) {
        0 => "Joined today".to_string(),
        1 => "Joined 1 day ago".to_string(),
        n => format!("Joined {n} days ago"),
    }
}
