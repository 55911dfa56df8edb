use chrono::Utc;

use crate::events::{dispatch, SessionEvent};
use crate::{AuthBackend, AuthError, Session, SessionManager, SessionStore};

use super::require_credentials;

pub struct LoginAction<S: SessionStore, B: AuthBackend> {
    manager: SessionManager<S, B>,
}

impl<S: SessionStore, B: AuthBackend> LoginAction<S, B> {
    pub fn new(manager: SessionManager<S, B>) -> Self {
        LoginAction { manager }
    }

    /// Signs in with email and password and persists the resulting session.
    ///
    /// # Returns
    ///
    /// - `Ok(Session)` - credentials accepted, session stored
    /// - `Err(AuthError::BackendError(_))` - rejected, with the backend's message
    /// - `Err(_)` - input, network or storage errors
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "login", skip_all, err)
    )]
    pub async fn execute(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        require_credentials(email, password)?;

        let response = self.manager.backend().login(email, password).await?;
        let (token, user) = match response.into_credentials("Login failed") {
            Ok(credentials) => credentials,
            Err(e) => {
                log::info!(
                    target: "autodig_session",
                    "msg=\"login failed\" email=\"{}\" reason=\"{}\"",
                    email,
                    e
                );
                dispatch(SessionEvent::LoginFailed {
                    email: email.to_owned(),
                    reason: e.to_string(),
                    at: Utc::now(),
                })
                .await;
                return Err(e);
            }
        };

        let session = self.manager.create_session(token, user)?;

        dispatch(SessionEvent::LoginSucceeded {
            user_id: session.user.id.clone(),
            email: session.user.email.clone(),
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "autodig_session",
            "msg=\"login success\" user_id=\"{}\"",
            session.user.id
        );

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemorySessionStore, MockAuthBackend, SessionConfig};

    fn action(backend: MockAuthBackend) -> (LoginAction<MemorySessionStore, MockAuthBackend>, MemorySessionStore) {
        let store = MemorySessionStore::new();
        let manager = SessionManager::new(store.clone(), backend, SessionConfig::default());
        (LoginAction::new(manager), store)
    }

    #[tokio::test]
    async fn test_login_creates_session() {
        let backend = MockAuthBackend::new().with_account("user@email.com", "securepassword");
        let (login, store) = action(backend);

        let session = login.execute("user@email.com", "securepassword").await.unwrap();
        assert_eq!(session.user.email, "user@email.com");
        assert!(!session.token.is_blank());

        assert!(store.contains_key("autodig_session"));
        assert!(store.contains_key("token"));
        assert!(store.contains_key("user"));
        assert!(login.manager.is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let backend = MockAuthBackend::new().with_account("user@email.com", "securepassword");
        let (login, store) = action(backend);

        let err = login.execute("user@email.com", "wrongpassword").await.unwrap_err();
        assert_eq!(err, AuthError::BackendError("Invalid email or password".to_owned()));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_login_keeps_existing_session_on_failure() {
        let backend = MockAuthBackend::new().with_account("user@email.com", "securepassword");
        let (login, _) = action(backend);

        login.execute("user@email.com", "securepassword").await.unwrap();
        assert!(login.execute("user@email.com", "nope").await.is_err());

        assert!(login.manager.is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn test_login_requires_credentials() {
        let (login, _) = action(MockAuthBackend::new());

        let err = login.execute("  ", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
        let err = login.execute("a@b.com", "").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)));
    }
}
