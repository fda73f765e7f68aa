//! Friend list and request state.
//!
//! Loads degrade to empty lists with an error message. Mutations return the
//! error and leave the local lists untouched when the backend refuses.

use super::client::SocialClient;
use super::types::{FriendRequest, RequestStatus, UserConnection};
use crate::remote::RemoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipStatus {
    None,
    Pending,
    Friends,
}

impl FriendshipStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Friends => "friends",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FriendsState {
    requests: Vec<FriendRequest>,
    friends: Vec<UserConnection>,
    error: Option<String>,
}

impl FriendsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[FriendRequest] {
        &self.requests
    }

    pub fn friends(&self) -> &[UserConnection] {
        &self.friends
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // ========================================================================
    // Derived Views
    // ========================================================================

    pub fn pending_requests(&self) -> impl Iterator<Item = &FriendRequest> {
        self.requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
    }

    /// Pending requests the current user sent.
    pub fn sent_requests<'a>(
        &'a self,
        current_user_id: &'a str,
    ) -> impl Iterator<Item = &'a FriendRequest> {
        self.pending_requests()
            .filter(move |r| r.from_user.id == current_user_id)
    }

    /// Pending requests addressed to the current user.
    pub fn received_requests<'a>(
        &'a self,
        current_user_id: &'a str,
    ) -> impl Iterator<Item = &'a FriendRequest> {
        self.pending_requests()
            .filter(move |r| r.to_user.id == current_user_id)
    }

    pub fn friends_count(&self) -> usize {
        self.friends.len()
    }

    pub fn online_friends(&self) -> usize {
        self.friends.iter().filter(|c| c.friend.is_online).count()
    }

    pub fn is_friend(&self, user_id: &str) -> bool {
        self.friends.iter().any(|c| c.friend.id == user_id)
    }

    /// A pending request between the current user and `user_id`, either way.
    pub fn has_pending_request(&self, current_user_id: &str, user_id: &str) -> bool {
        self.pending_requests().any(|r| {
            (r.from_user.id == current_user_id && r.to_user.id == user_id)
                || (r.to_user.id == current_user_id && r.from_user.id == user_id)
        })
    }

    pub fn friendship_status(&self, current_user_id: &str, user_id: &str) -> FriendshipStatus {
        if self.is_friend(user_id) {
            FriendshipStatus::Friends
        } else if self.has_pending_request(current_user_id, user_id) {
            FriendshipStatus::Pending
        } else {
            FriendshipStatus::None
        }
    }

    /// Forget everything (on logout).
    pub fn clear(&mut self) {
        self.requests.clear();
        self.friends.clear();
        self.error = None;
    }

    // ========================================================================
    // Backend Operations
    // ========================================================================

    /// Reload requests and friends. Failures leave that list empty.
    pub async fn refresh(&mut self, client: &SocialClient) {
        self.error = None;
        let (requests, friends) = tokio::join!(client.friend_requests(), client.friends());

        self.requests = requests.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load friend requests");
            self.error = Some("Failed to load friend requests".to_string());
            Vec::new()
        });
        self.friends = friends.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load friends");
            self.error = Some("Failed to load friends".to_string());
            Vec::new()
        });
    }

    /// Send a request and track it locally as pending.
    ///
    /// # Errors
    ///
    /// The backend error is returned and also kept as [`error`](Self::error)
    /// for the status line.
    pub async fn send_request(
        &mut self,
        client: &SocialClient,
        to_user_id: &str,
        message: Option<&str>,
    ) -> Result<&FriendRequest, RemoteError> {
        self.error = None;
        let request = client
            .send_friend_request(to_user_id, message)
            .await
            .inspect_err(|e| self.record_failure("Failed to send friend request", e))?;
        self.requests.push(request);
        // Just pushed, so the list is non-empty
        Ok(&self.requests[self.requests.len() - 1])
    }

    /// Accept a received request. The new connection joins the friends list
    /// without a refresh.
    pub async fn accept_request(
        &mut self,
        client: &SocialClient,
        request_id: &str,
    ) -> Result<&UserConnection, RemoteError> {
        self.error = None;
        let connection = client
            .accept_friend_request(request_id)
            .await
            .inspect_err(|e| self.record_failure("Failed to accept friend request", e))?;
        self.set_request_status(request_id, RequestStatus::Accepted);
        self.friends.push(connection);
        Ok(&self.friends[self.friends.len() - 1])
    }

    pub async fn reject_request(
        &mut self,
        client: &SocialClient,
        request_id: &str,
    ) -> Result<(), RemoteError> {
        self.error = None;
        client
            .reject_friend_request(request_id)
            .await
            .inspect_err(|e| self.record_failure("Failed to reject friend request", e))?;
        self.set_request_status(request_id, RequestStatus::Rejected);
        Ok(())
    }

    pub async fn remove_friend(
        &mut self,
        client: &SocialClient,
        friend_id: &str,
    ) -> Result<(), RemoteError> {
        self.error = None;
        client
            .remove_friend(friend_id)
            .await
            .inspect_err(|e| self.record_failure("Failed to remove friend", e))?;
        self.friends.retain(|c| c.friend.id != friend_id);
        Ok(())
    }

    fn set_request_status(&mut self, request_id: &str, status: RequestStatus) {
        for request in self.requests.iter_mut().filter(|r| r.id == request_id) {
            request.status = status;
        }
    }

    fn record_failure(&mut self, what: &str, error: &RemoteError) {
        tracing::warn!(error = %error, "{what}");
        self.error = Some(what.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote;
    use crate::social::types::{ConnectionStatus, UserSummary};
    use chrono::Utc;
    use secrecy::SecretString;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summary(id: &str, online: bool) -> UserSummary {
        UserSummary {
            id: id.to_string(),
            username: id.to_string(),
            display_name: id.to_uppercase(),
            avatar_url: None,
            is_online: online,
        }
    }

    fn request(id: &str, from: &str, to: &str, status: RequestStatus) -> FriendRequest {
        FriendRequest {
            id: id.to_string(),
            from_user: summary(from, false),
            to_user: summary(to, false),
            message: None,
            status,
            created_at: Utc::now(),
        }
    }

    fn connection(friend: &str, online: bool) -> UserConnection {
        UserConnection {
            id: format!("c-{friend}"),
            friend: summary(friend, online),
            status: ConnectionStatus::Accepted,
            created_at: Utc::now(),
        }
    }

    fn state() -> FriendsState {
        FriendsState {
            requests: vec![
                request("r1", "me", "bob", RequestStatus::Pending),
                request("r2", "carol", "me", RequestStatus::Pending),
                request("r3", "dave", "me", RequestStatus::Rejected),
            ],
            friends: vec![connection("erin", true), connection("frank", false)],
            error: None,
        }
    }

    #[test]
    fn test_request_views() {
        let state = state();
        assert_eq!(state.pending_requests().count(), 2);
        let sent: Vec<_> = state.sent_requests("me").map(|r| r.id.as_str()).collect();
        assert_eq!(sent, vec!["r1"]);
        let received: Vec<_> = state.received_requests("me").map(|r| r.id.as_str()).collect();
        assert_eq!(received, vec!["r2"]);
    }

    #[test]
    fn test_counts() {
        let state = state();
        assert_eq!(state.friends_count(), 2);
        assert_eq!(state.online_friends(), 1);
    }

    #[test]
    fn test_friendship_status() {
        let state = state();
        assert_eq!(state.friendship_status("me", "erin"), FriendshipStatus::Friends);
        assert_eq!(state.friendship_status("me", "bob"), FriendshipStatus::Pending);
        assert_eq!(state.friendship_status("me", "carol"), FriendshipStatus::Pending);
        assert_eq!(state.friendship_status("me", "dave"), FriendshipStatus::None);
    }

    #[test]
    fn test_clear() {
        let mut state = state();
        state.clear();
        assert_eq!(state.friends_count(), 0);
        assert!(state.requests().is_empty());
    }

    async fn client(server: &MockServer) -> SocialClient {
        SocialClient::new(remote::build_client().unwrap(), &server.uri())
            .unwrap()
            .with_token(Some(SecretString::from("t")))
    }

    #[tokio::test]
    async fn test_refresh_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/friends/requests"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/friends"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let mut state = state();
        state.refresh(&client(&server).await).await;
        assert!(state.requests().is_empty());
        assert!(state.friends().is_empty());
        assert_eq!(state.error(), Some("Failed to load friend requests"));
    }

    #[tokio::test]
    async fn test_failed_remove_keeps_friend() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut state = state();
        let result = state.remove_friend(&client(&server).await, "erin").await;
        assert!(result.is_err());
        assert!(state.is_friend("erin"));
        assert_eq!(state.error(), Some("Failed to remove friend"));
    }

    #[tokio::test]
    async fn test_reject_updates_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/friends/requests/r2/reject"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut state = state();
        state
            .reject_request(&client(&server).await, "r2")
            .await
            .unwrap();
        assert_eq!(state.received_requests("me").count(), 0);
        assert!(state.error().is_none());
    }
}
