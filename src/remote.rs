//! HTTP plumbing shared by the catalog and social clients.
//!
//! Every request goes through [`send`], which applies the request timeout and
//! maps non-success statuses to [`RemoteError::HttpStatus`]. Bodies are read
//! through [`read_limited`] so a misbehaving server cannot exhaust memory.

use futures::StreamExt;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Largest JSON body accepted from either backend.
pub const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Request timed out after 20s")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {status}{}", describe(.message))]
    HttpStatus {
        status: u16,
        message: Option<String>,
    },
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
    #[error("Not signed in")]
    NotAuthenticated,
    #[error("Failed to read upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("Upload too large (exceeds {0} bytes)")]
    UploadTooLarge(u64),
}

fn describe(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" ({m})"))
        .unwrap_or_default()
}

impl RemoteError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403)) || matches!(self, RemoteError::NotAuthenticated)
    }

    /// Message suitable for the status line.
    pub fn user_message(&self) -> String {
        match self {
            RemoteError::HttpStatus {
                message: Some(m), ..
            } => m.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// Client Construction
// ============================================================================

/// Redirect policy: at most 3 hops, no loops.
fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

pub fn build_client() -> Result<reqwest::Client, RemoteError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("reelswipe/", env!("CARGO_PKG_VERSION")))
        .redirect(redirect_policy())
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

/// Parse a base URL and require HTTPS, except for local development hosts.
pub fn validate_base_url(base: &str) -> Result<Url, RemoteError> {
    let url = Url::parse(base.trim_end_matches('/'))?;
    match url.scheme() {
        "https" => Ok(url),
        "http" if matches!(url.host_str(), Some("localhost" | "127.0.0.1")) => {
            tracing::warn!(base_url = %url, "Using non-HTTPS base URL (localhost only)");
            Ok(url)
        }
        _ => {
            tracing::error!(base_url = %base, "Rejecting non-HTTPS base URL");
            Err(RemoteError::InsecureBaseUrl)
        }
    }
}

/// Append path segments to `base`, percent-encoding each one.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, RemoteError> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| {
                RemoteError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

// ============================================================================
// Request Execution
// ============================================================================

/// Send with the request timeout; non-2xx becomes `HttpStatus`.
pub async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
    let response = tokio::time::timeout(REQUEST_TIMEOUT, request.send())
        .await
        .map_err(|_| RemoteError::Timeout)?
        .map_err(RemoteError::Network)?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Backends report {"message": "..."} on errors
    let message = read_limited(response, 64 * 1024)
        .await
        .ok()
        .and_then(|body| serde_json::from_slice::<serde_json::Value>(&body).ok())
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));

    Err(RemoteError::HttpStatus {
        status: status.as_u16(),
        message,
    })
}

/// Send and decode a JSON body.
pub async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, RemoteError> {
    let response = send(request).await?;
    let body = read_limited(response, MAX_RESPONSE_SIZE).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Attach a JSON body.
pub fn with_json<B: serde::Serialize + ?Sized>(
    request: reqwest::RequestBuilder,
    body: &B,
) -> Result<reqwest::RequestBuilder, RemoteError> {
    let bytes = serde_json::to_vec(body)?;
    Ok(request
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(bytes))
}

/// Read a response body, failing once it exceeds `limit` bytes.
pub async fn read_limited(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, RemoteError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(RemoteError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(RemoteError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(RemoteError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_https_base_url_allowed() {
        let url = validate_base_url("https://api.themoviedb.org/3/").unwrap();
        assert_eq!(url.as_str(), "https://api.themoviedb.org/3");
    }

    #[test]
    fn test_localhost_http_allowed() {
        assert!(validate_base_url("http://localhost:8080/api").is_ok());
        assert!(validate_base_url("http://127.0.0.1:9999").is_ok());
    }

    #[test]
    fn test_remote_http_rejected() {
        let err = validate_base_url("http://api.example.com").unwrap_err();
        assert!(matches!(err, RemoteError::InsecureBaseUrl));
    }

    #[test]
    fn test_garbage_url_rejected() {
        assert!(matches!(
            validate_base_url("not a url"),
            Err(RemoteError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let base = validate_base_url("http://localhost:8080/api").unwrap();
        let url = endpoint(&base, &["friends", "a b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/friends/a%20b");
    }

    #[test]
    fn test_endpoint_on_root_base() {
        let base = validate_base_url("http://127.0.0.1:1234/").unwrap();
        let url = endpoint(&base, &["movie", "popular"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:1234/movie/popular");
    }

    #[tokio::test]
    async fn test_error_status_carries_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/boom"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_string(r#"{"message":"Friend request already sent"}"#),
            )
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let err = send(client.get(format!("{}/boom", server.uri())))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.user_message(), "Friend request already sent");
        assert!(err.to_string().contains("409"));
    }

    #[tokio::test]
    async fn test_response_too_large() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(2048)))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let response = send(client.get(server.uri())).await.unwrap();
        let err = read_limited(response, 1024).await.unwrap_err();
        assert!(matches!(err, RemoteError::ResponseTooLarge(1024)));
    }

    #[tokio::test]
    async fn test_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = build_client().unwrap();
        let result: Result<serde_json::Value, _> = send_json(client.get(server.uri())).await;
        assert!(matches!(result, Err(RemoteError::Decode(_))));
    }
}
