use chrono::Utc;

use crate::events::{dispatch, SessionEvent};
use crate::{AuthBackend, AuthError, SessionManager, SessionStore, User};

use super::require_credentials;

/// Creates an account. The user still has to sign in afterwards; no
/// session is stored.
pub struct SignupAction<S: SessionStore, B: AuthBackend> {
    manager: SessionManager<S, B>,
}

impl<S: SessionStore, B: AuthBackend> SignupAction<S, B> {
    pub fn new(manager: SessionManager<S, B>) -> Self {
        SignupAction { manager }
    }

    /// Returns the created user when the backend echoes one.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "signup", skip_all, err)
    )]
    pub async fn execute(&self, email: &str, password: &str) -> Result<Option<User>, AuthError> {
        require_credentials(email, password)?;

        let response = self
            .manager
            .backend()
            .signup(email, password)
            .await?
            .ensure_success("Signup failed")?;

        dispatch(SessionEvent::SignupSucceeded {
            email: email.to_owned(),
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "autodig_session",
            "msg=\"signup success\" email=\"{}\"",
            email
        );

        Ok(response.user)
    }
}
