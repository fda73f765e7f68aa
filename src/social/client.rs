use secrecy::{ExposeSecret, SecretString};
use std::path::Path;
use url::Url;

use super::types::{
    AuthProvider, AuthResponse, AvatarResponse, FriendRequest, LoginRequest, RegisterRequest,
    SendFriendRequest, UpdateProfile, UserConnection, UserProfile, UserSearchResult,
};
use crate::remote::{self, RemoteError};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080/api";

/// Largest avatar accepted for upload.
pub const MAX_AVATAR_SIZE: u64 = 5 * 1024 * 1024;

/// Client for the auth/friends/profiles backend.
///
/// Endpoints other than login and register need a bearer token; calling them
/// without one fails with [`RemoteError::NotAuthenticated`] before any
/// request is made.
#[derive(Clone)]
pub struct SocialClient {
    http: reqwest::Client,
    base: Url,
    token: Option<SecretString>,
}

impl std::fmt::Debug for SocialClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocialClient")
            .field("base", &self.base.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl SocialClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self, RemoteError> {
        Ok(Self {
            http,
            base: remote::validate_base_url(base_url)?,
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<SecretString>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<SecretString>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        remote::endpoint(&self.base, segments)
    }

    fn authed(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, RemoteError> {
        let token = self.token.as_ref().ok_or(RemoteError::NotAuthenticated)?;
        Ok(request.bearer_auth(token.expose_secret()))
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthResponse, RemoteError> {
        let body = RegisterRequest {
            email,
            password,
            name,
            provider: AuthProvider::Email,
        };
        let request = remote::with_json(self.http.post(self.url(&["auth", "register"])?), &body)?;
        let response: AuthResponse = remote::send_json(request).await?;
        tracing::info!(user_id = %response.user.id, "Registered account");
        Ok(response)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, RemoteError> {
        let body = LoginRequest {
            email,
            password,
            provider: AuthProvider::Email,
        };
        let request = remote::with_json(self.http.post(self.url(&["auth", "login"])?), &body)?;
        let response: AuthResponse = remote::send_json(request).await?;
        tracing::info!(user_id = %response.user.id, "Signed in");
        Ok(response)
    }

    // ========================================================================
    // Friends
    // ========================================================================

    pub async fn friend_requests(&self) -> Result<Vec<FriendRequest>, RemoteError> {
        let request = self.authed(self.http.get(self.url(&["friends", "requests"])?))?;
        remote::send_json(request).await
    }

    pub async fn send_friend_request(
        &self,
        to_user_id: &str,
        message: Option<&str>,
    ) -> Result<FriendRequest, RemoteError> {
        let body = SendFriendRequest {
            to_user_id: to_user_id.to_string(),
            message: message.map(str::to_string),
        };
        let request = self.authed(self.http.post(self.url(&["friends", "requests"])?))?;
        remote::send_json(remote::with_json(request, &body)?).await
    }

    pub async fn accept_friend_request(
        &self,
        request_id: &str,
    ) -> Result<UserConnection, RemoteError> {
        let url = self.url(&["friends", "requests", request_id, "accept"])?;
        let request = self.authed(self.http.put(url))?;
        remote::send_json(remote::with_json(request, &serde_json::json!({}))?).await
    }

    pub async fn reject_friend_request(&self, request_id: &str) -> Result<(), RemoteError> {
        let url = self.url(&["friends", "requests", request_id, "reject"])?;
        let request = self.authed(self.http.put(url))?;
        remote::send(remote::with_json(request, &serde_json::json!({}))?).await?;
        Ok(())
    }

    pub async fn friends(&self) -> Result<Vec<UserConnection>, RemoteError> {
        let request = self.authed(self.http.get(self.url(&["friends"])?))?;
        remote::send_json(request).await
    }

    pub async fn remove_friend(&self, friend_id: &str) -> Result<(), RemoteError> {
        let request = self.authed(self.http.delete(self.url(&["friends", friend_id])?))?;
        remote::send(request).await?;
        Ok(())
    }

    // ========================================================================
    // Profiles
    // ========================================================================

    pub async fn my_profile(&self) -> Result<UserProfile, RemoteError> {
        let request = self.authed(self.http.get(self.url(&["profiles", "me"])?))?;
        remote::send_json(request).await
    }

    pub async fn update_profile(&self, update: &UpdateProfile) -> Result<UserProfile, RemoteError> {
        let request = self.authed(self.http.put(self.url(&["profiles", "me"])?))?;
        remote::send_json(remote::with_json(request, update)?).await
    }

    pub async fn profile(&self, user_id: &str) -> Result<UserProfile, RemoteError> {
        let request = self.authed(self.http.get(self.url(&["profiles", user_id])?))?;
        remote::send_json(request).await
    }

    pub async fn search_users(
        &self,
        query: &str,
        page: u32,
        size: u32,
    ) -> Result<UserSearchResult, RemoteError> {
        let mut url = self.url(&["profiles", "search"])?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());
        let request = self.authed(self.http.get(url))?;
        remote::send_json(request).await
    }

    /// Upload an image as the multipart field `avatar`. Returns the new URL.
    pub async fn upload_avatar(&self, path: &Path) -> Result<String, RemoteError> {
        let metadata = tokio::fs::metadata(path).await?;
        if metadata.len() > MAX_AVATAR_SIZE {
            return Err(RemoteError::UploadTooLarge(MAX_AVATAR_SIZE));
        }
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("avatar")
            .to_string();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(image_mime(path))?;
        let form = reqwest::multipart::Form::new().part("avatar", part);

        let request = self.authed(self.http.post(self.url(&["profiles", "avatar"])?))?;
        let response: AvatarResponse = remote::send_json(request.multipart(form)).await?;
        tracing::info!("Avatar uploaded");
        Ok(response.avatar_url)
    }
}

fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USER_JSON: &str =
        r#"{"id":"u1","email":"ana@example.com","name":"Ana","provider":"email"}"#;

    async fn client(server: &MockServer) -> SocialClient {
        SocialClient::new(remote::build_client().unwrap(), &server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_login_posts_email_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(serde_json::json!({
                "email": "ana@example.com",
                "password": "secret",
                "provider": "email"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(format!(r#"{{"user":{USER_JSON},"token":"jwt-1"}}"#)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let auth = client(&server)
            .await
            .login("ana@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(auth.token, "jwt-1");
        assert_eq!(auth.user.name, "Ana");
    }

    #[tokio::test]
    async fn test_register_bad_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"message":"Email already in use"}"#),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .register("ana@example.com", "pw", "Ana")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Email already in use");
    }

    #[tokio::test]
    async fn test_authed_call_without_token_fails_fast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server).await.friends().await.unwrap_err();
        assert!(matches!(err, RemoteError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/friends/u2"))
            .and(header("authorization", "Bearer jwt-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .await
            .with_token(Some(SecretString::from("jwt-1")))
            .remove_friend("u2")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_users_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profiles/search"))
            .and(query_param("query", "ana maria"))
            .and(query_param("page", "0"))
            .and(query_param("size", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"users":[{"id":"u1","username":"ana","displayName":"Ana"}],"totalCount":1,"currentPage":0,"totalPages":1}"#,
            ))
            .mount(&server)
            .await;

        let result = client(&server)
            .await
            .with_token(Some(SecretString::from("t")))
            .search_users("ana maria", 0, 10)
            .await
            .unwrap();
        assert_eq!(result.total_count, 1);
        assert_eq!(result.users[0].username, "ana");
    }

    #[tokio::test]
    async fn test_upload_avatar_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/profiles/avatar"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"avatarUrl":"https://cdn.example.com/a.png"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = std::env::temp_dir().join("reelswipe_avatar_test");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("me.png");
        std::fs::write(&file, [0x89, b'P', b'N', b'G']).unwrap();

        let url = client(&server)
            .await
            .with_token(Some(SecretString::from("t")))
            .upload_avatar(&file)
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/a.png");

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"avatar\""));
        assert!(body.contains("image/png"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(image_mime(Path::new("a.webp")), "image/webp");
        assert_eq!(image_mime(Path::new("a")), "application/octet-stream");
    }

    #[test]
    fn test_debug_masks_token() {
        let client = SocialClient::new(reqwest::Client::new(), DEFAULT_BACKEND_URL)
            .unwrap()
            .with_token(Some(SecretString::from("jwt-secret")));
        let debug = format!("{client:?}");
        assert!(!debug.contains("jwt-secret"));
    }
}
