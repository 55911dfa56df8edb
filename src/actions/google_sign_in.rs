use chrono::Utc;

use crate::events::{dispatch, SessionEvent};
use crate::{AuthBackend, AuthError, Session, SessionManager, SessionStore};

/// Exchanges a Google identity credential for a session.
pub struct GoogleSignInAction<S: SessionStore, B: AuthBackend> {
    manager: SessionManager<S, B>,
}

impl<S: SessionStore, B: AuthBackend> GoogleSignInAction<S, B> {
    pub fn new(manager: SessionManager<S, B>) -> Self {
        GoogleSignInAction { manager }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "google_sign_in", skip_all, err)
    )]
    pub async fn execute(&self, id_token: &str) -> Result<Session, AuthError> {
        if id_token.trim().is_empty() {
            return Err(AuthError::InvalidInput("ID token is required".to_owned()));
        }

        let (token, user) = self
            .manager
            .backend()
            .google_sign_in(id_token)
            .await?
            .into_credentials("Authentication failed")
            .inspect_err(|e| {
                log::warn!(
                    target: "autodig_session",
                    "msg=\"google sign-in failed\" reason=\"{}\"",
                    e
                );
            })?;

        let session = self.manager.create_session(token, user)?;

        dispatch(SessionEvent::GoogleSignInSucceeded {
            user_id: session.user.id.clone(),
            email: session.user.email.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemorySessionStore, MockAuthBackend, SessionConfig};

    fn action(backend: MockAuthBackend) -> GoogleSignInAction<MemorySessionStore, MockAuthBackend> {
        let manager = SessionManager::new(MemorySessionStore::new(), backend, SessionConfig::default());
        GoogleSignInAction::new(manager)
    }

    #[tokio::test]
    async fn test_google_sign_in_creates_session() {
        let google = action(MockAuthBackend::new().with_google_account("gid-123", "g@example.com"));

        let session = google.execute("gid-123").await.unwrap();
        assert_eq!(session.user.email, "g@example.com");
        assert_eq!(session.user.is_google_user, Some(true));
        assert!(google.manager.is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn test_google_sign_in_requires_token() {
        let google = action(MockAuthBackend::new());

        let err = google.execute("").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidInput("ID token is required".to_owned()));
    }

    #[tokio::test]
    async fn test_google_sign_in_unknown_token() {
        let google = action(MockAuthBackend::new());

        let err = google.execute("forged").await.unwrap_err();
        assert!(matches!(err, AuthError::BackendError(_)));
        assert!(!google.manager.is_authenticated().unwrap());
    }
}
