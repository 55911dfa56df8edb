use chrono::Utc;

use crate::events::{dispatch, SessionEvent};
use crate::{AuthBackend, AuthError, SessionManager, SessionStore};

/// Signs the user out locally. The backend is not contacted; bearer
/// tokens simply stop being sent.
pub struct LogoutAction<S: SessionStore, B: AuthBackend> {
    manager: SessionManager<S, B>,
}

impl<S: SessionStore, B: AuthBackend> LogoutAction<S, B> {
    pub fn new(manager: SessionManager<S, B>) -> Self {
        LogoutAction { manager }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "logout", skip_all, err)
    )]
    pub async fn execute(&self) -> Result<(), AuthError> {
        // read the user for the event before the record disappears
        let user_id = self.manager.get_current_user()?.map(|u| u.id);

        self.manager.clear_session()?;

        dispatch(SessionEvent::LogoutSucceeded {
            user_id,
            at: Utc::now(),
        })
        .await;

        log::info!(
            target: "autodig_session",
            "msg=\"logout success\""
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BearerToken, MemorySessionStore, MockAuthBackend, SessionConfig, User};

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let store = MemorySessionStore::new();
        let manager = SessionManager::new(store.clone(), MockAuthBackend::new(), SessionConfig::default());
        manager
            .create_session(BearerToken::new("tok"), User::new("1", "a@b.com"))
            .unwrap();
        store.set("temp_user", "{}").unwrap();

        LogoutAction::new(manager).execute().await.unwrap();

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_logout_without_session() {
        let manager = SessionManager::new(
            MemorySessionStore::new(),
            MockAuthBackend::new(),
            SessionConfig::default(),
        );
        assert!(LogoutAction::new(manager).execute().await.is_ok());
    }
}
