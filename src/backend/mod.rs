//! Backend auth endpoints.
//!
//! [`AuthBackend`] is the seam between the session client and the server.
//! The crate ships an HTTP implementation and, with the `mocks` feature,
//! an in-memory one for tests.
//!
//! | Implementation | Description |
//! |----------------|-------------|
//! | [`HttpAuthBackend`] | `reqwest` client against the dashboard API |
//! | [`MockAuthBackend`] | Scripted in-memory backend (`mocks` feature) |

mod http;
#[cfg(any(test, feature = "mocks"))]
mod mock;

use async_trait::async_trait;
pub use http::HttpAuthBackend;
#[cfg(any(test, feature = "mocks"))]
pub use mock::{MockAuthBackend, MockValidation};
use serde::{Deserialize, Serialize};

use crate::{AuthError, BearerToken, User};

/// Outcome of a token validation request that reached the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// The backend answered 2xx.
    Valid,
    /// The backend answered with a non-2xx status.
    Rejected { status: u16 },
}

/// Body returned by the login, sign-up and Google endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<BearerToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AuthResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn authenticated(token: BearerToken, user: User) -> Self {
        Self {
            success: true,
            token: Some(token),
            user: Some(user),
            message: None,
        }
    }

    /// Turns `success: false` into [`AuthError::BackendError`] carrying the
    /// backend's message, or `fallback` when it sent none.
    pub fn ensure_success(self, fallback: &str) -> Result<Self, AuthError> {
        if self.success {
            Ok(self)
        } else {
            let message = self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_owned());
            Err(AuthError::BackendError(message))
        }
    }

    /// Extracts the credentials a session is built from.
    pub fn into_credentials(self, fallback: &str) -> Result<(BearerToken, User), AuthError> {
        let response = self.ensure_success(fallback)?;
        match (response.token, response.user) {
            (Some(token), Some(user)) if !token.is_blank() => Ok((token, user)),
            _ => Err(AuthError::InvalidResponse(
                "success response without token and user".to_owned(),
            )),
        }
    }
}

/// The backend auth endpoints the session client talks to.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Checks a bearer token. Only the HTTP status is inspected.
    ///
    /// # Errors
    ///
    /// [`AuthError::NetworkError`] when no status was received at all.
    async fn validate(&self, token: &BearerToken) -> Result<TokenStatus, AuthError>;

    /// Email/password sign-in.
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError>;

    /// Account creation. The backend does not sign the user in.
    async fn signup(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError>;

    /// Exchanges a Google identity token for a session token.
    async fn google_sign_in(&self, id_token: &str) -> Result<AuthResponse, AuthError>;
}

#[async_trait]
impl<T: AuthBackend + ?Sized> AuthBackend for std::sync::Arc<T> {
    async fn validate(&self, token: &BearerToken) -> Result<TokenStatus, AuthError> {
        (**self).validate(token).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        (**self).login(email, password).await
    }

    async fn signup(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        (**self).signup(email, password).await
    }

    async fn google_sign_in(&self, id_token: &str) -> Result<AuthResponse, AuthError> {
        (**self).google_sign_in(id_token).await
    }
}
