//! HTTP implementation of [`AuthBackend`].

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;

use super::{AuthBackend, AuthResponse, TokenStatus};
use crate::config::BackendConfig;
use crate::{AuthError, BearerToken};

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleBody<'a> {
    id_token: &'a str,
}

/// Talks to the dashboard API over HTTP.
///
/// The underlying `reqwest::Client` is built once and shared by clones.
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl HttpAuthBackend {
    /// Builds a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidConfig`] if the config does not validate
    /// or the client cannot be constructed.
    pub fn new(config: BackendConfig) -> Result<Self, AuthError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AuthError::InvalidConfig(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Uses a caller-provided client, e.g. one with a proxy configured.
    pub fn with_client(client: reqwest::Client, config: BackendConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<AuthResponse, AuthError> {
        let url = self.config.url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        match serde_json::from_slice::<AuthResponse>(&bytes) {
            Ok(mut parsed) => {
                // a non-2xx status always means failure, whatever the body says
                if !status.is_success() {
                    parsed.success = false;
                }
                Ok(parsed)
            }
            Err(_) if !status.is_success() => {
                log::debug!(
                    target: "autodig_session::backend",
                    "msg=\"non-json error body\" path=\"{}\" status={}",
                    path,
                    status.as_u16()
                );
                Ok(AuthResponse::failure(format!(
                    "{fallback} (HTTP {})",
                    status.as_u16()
                )))
            }
            Err(e) => Err(AuthError::InvalidResponse(format!(
                "{path} returned an unreadable body: {e}"
            ))),
        }
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn validate(&self, token: &BearerToken) -> Result<TokenStatus, AuthError> {
        let url = self.config.url(&self.config.validate_path);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        Ok(TokenStatus::from(response.status()))
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let body = CredentialsBody { email, password };
        self.post_json(&self.config.login_path, &body, "Login failed")
            .await
    }

    async fn signup(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let body = CredentialsBody { email, password };
        self.post_json(&self.config.signup_path, &body, "Signup failed")
            .await
    }

    async fn google_sign_in(&self, id_token: &str) -> Result<AuthResponse, AuthError> {
        let body = GoogleBody { id_token };
        self.post_json(&self.config.google_path, &body, "Authentication failed")
            .await
    }
}

impl From<StatusCode> for TokenStatus {
    fn from(status: StatusCode) -> Self {
        if status.is_success() {
            TokenStatus::Valid
        } else {
            TokenStatus::Rejected {
                status: status.as_u16(),
            }
        }
    }
}
