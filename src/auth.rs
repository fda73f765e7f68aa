//! Sign-in state.
//!
//! The token and user record are persisted together; a restore with only one
//! of them present counts as signed out. Every change is mirrored into the
//! [`UserSession`] so preference logs follow the signed-in user.

use secrecy::SecretString;
use thiserror::Error;

use crate::remote::RemoteError;
use crate::session::UserSession;
use crate::social::{AuthResponse, SocialClient, User};
use crate::storage::{Storage, StorageError};
use crate::validation::{self, ValidationError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Registration failed: {}", .0.user_message())]
    RegistrationFailed(RemoteError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Fields of the sign-up form.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm: &'a str,
}

/// The signed-in user and bearer token, if any.
///
/// Both are `Some` or both are `None`. Storage is written before the
/// in-memory fields change.
#[derive(Debug, Default)]
pub struct AuthState {
    user: Option<User>,
    token: Option<SecretString>,
}

impl AuthState {
    /// Load the persisted token and user.
    pub async fn restore(storage: &Storage) -> Result<Self, StorageError> {
        let token = storage.auth_token().await?;
        let user = storage.auth_user().await?;
        match (token, user) {
            (Some(token), Some(user)) => {
                tracing::debug!(user_id = %user.id, "Restored sign-in");
                Ok(Self {
                    user: Some(user),
                    token: Some(token),
                })
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Bring the session in line with the restored sign-in state.
    pub async fn sync_session(
        &self,
        storage: &Storage,
        session: &mut UserSession,
    ) -> Result<(), StorageError> {
        match &self.user {
            Some(user) if self.token.is_some() => {
                if session.user_id.as_deref() != Some(user.id.as_str()) || !session.is_authenticated
                {
                    session.migrate_to_authenticated(storage, &user.id).await?;
                }
                Ok(())
            }
            _ => session.reset_to_anonymous(storage).await,
        }
    }

    /// Validate the form locally, then sign in against the backend.
    ///
    /// On success the token and user are persisted, the client carries the
    /// token from now on, and the session is migrated to the user id.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for an empty email or password, before
    ///   any request is made
    /// - [`AuthError::InvalidCredentials`] when the backend answers 401 or 400
    /// - [`AuthError::Remote`] for every other backend failure
    /// - [`AuthError::Storage`] if the sign-in cannot be persisted
    pub async fn login(
        &mut self,
        storage: &Storage,
        client: &mut SocialClient,
        session: &mut UserSession,
        email: &str,
        password: &str,
    ) -> Result<&User, AuthError> {
        validation::validate_login(email, password)?;
        let response = client.login(email.trim(), password).await.map_err(|e| {
            tracing::warn!(error = %e, "Login failed");
            if e.is_unauthorized() || e.status() == Some(400) {
                AuthError::InvalidCredentials
            } else {
                AuthError::Remote(e)
            }
        })?;
        self.apply(storage, client, session, response).await
    }

    /// Create an account and sign in with it. Same persistence as
    /// [`login`](Self::login); backend failures become
    /// [`AuthError::RegistrationFailed`].
    pub async fn register(
        &mut self,
        storage: &Storage,
        client: &mut SocialClient,
        session: &mut UserSession,
        form: &Registration<'_>,
    ) -> Result<&User, AuthError> {
        validation::validate_registration(form.name, form.email, form.password, form.confirm)?;
        let response = client
            .register(form.email.trim(), form.password, form.name.trim())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Registration failed");
                AuthError::RegistrationFailed(e)
            })?;
        self.apply(storage, client, session, response).await
    }

    /// Persist a successful auth response and switch the session to the user.
    async fn apply(
        &mut self,
        storage: &Storage,
        client: &mut SocialClient,
        session: &mut UserSession,
        response: AuthResponse,
    ) -> Result<&User, AuthError> {
        let token = SecretString::from(response.token);
        storage.set_auth_token(&token).await?;
        storage.set_auth_user(&response.user).await?;
        session
            .migrate_to_authenticated(storage, &response.user.id)
            .await?;
        client.set_token(Some(token.clone()));
        tracing::info!(user_id = %response.user.id, "Signed in");

        self.token = Some(token);
        Ok(self.user.insert(response.user))
    }

    /// Forget the stored sign-in and return the session to its anonymous id.
    ///
    /// No request is made; the backend token simply stops being sent.
    pub async fn logout(
        &mut self,
        storage: &Storage,
        client: &mut SocialClient,
        session: &mut UserSession,
    ) -> Result<(), StorageError> {
        storage.clear_auth().await?;
        session.reset_to_anonymous(storage).await?;
        client.set_token(None);
        self.user = None;
        self.token = None;
        tracing::info!("Signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote;
    use secrecy::ExposeSecret;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const AUTH_JSON: &str = r#"{
        "user": {"id": "u1", "email": "ana@example.com", "name": "Ana", "provider": "email"},
        "token": "jwt-1"
    }"#;

    fn form<'a>(password: &'a str, confirm: &'a str) -> Registration<'a> {
        Registration {
            name: "Ana",
            email: "a@b.c",
            password,
            confirm,
        }
    }

    async fn fixture(server: &MockServer) -> (Storage, SocialClient, UserSession) {
        let storage = Storage::in_memory();
        let client = SocialClient::new(remote::build_client().unwrap(), &server.uri()).unwrap();
        let session = UserSession::load_or_create(&storage).await.unwrap();
        (storage, client, session)
    }

    #[tokio::test]
    async fn test_login_persists_and_migrates_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string(AUTH_JSON))
            .mount(&server)
            .await;
        let (storage, mut client, mut session) = fixture(&server).await;

        let mut auth = AuthState::default();
        auth.login(&storage, &mut client, &mut session, "ana@example.com", "pw")
            .await
            .unwrap();

        assert!(auth.is_authenticated());
        assert!(client.has_token());
        assert_eq!(session.identifier(), "u1");

        let restored = AuthState::restore(&storage).await.unwrap();
        assert_eq!(restored.user().map(|u| u.name.as_str()), Some("Ana"));
        assert_eq!(restored.token().unwrap().expose_secret(), "jwt-1");
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let (storage, mut client, mut session) = fixture(&server).await;

        let mut auth = AuthState::default();
        let err = auth
            .login(&storage, &mut client, &mut session, "ana@example.com", "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(!auth.is_authenticated());
        assert!(session.is_anonymous());
    }

    #[tokio::test]
    async fn test_register_validates_before_sending() {
        let server = MockServer::start().await;
        let (storage, mut client, mut session) = fixture(&server).await;

        let mut auth = AuthState::default();
        let err = auth
            .register(&storage, &mut client, &mut session, &form("pw1", "pw2"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation(ValidationError::PasswordMismatch)
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(201).set_body_string(AUTH_JSON))
            .mount(&server)
            .await;
        let (storage, mut client, mut session) = fixture(&server).await;
        let anonymous_id = session.session_id.clone();

        let mut auth = AuthState::default();
        auth.register(&storage, &mut client, &mut session, &form("pw", "pw"))
            .await
            .unwrap();
        auth.logout(&storage, &mut client, &mut session).await.unwrap();

        assert!(!auth.is_authenticated());
        assert!(!client.has_token());
        assert_eq!(session.identifier(), anonymous_id);
        assert!(!AuthState::restore(&storage).await.unwrap().is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_requires_token_and_user() {
        let storage = Storage::in_memory();
        storage
            .set_auth_token(&SecretString::from("orphan"))
            .await
            .unwrap();
        assert!(!AuthState::restore(&storage).await.unwrap().is_authenticated());
    }
}
