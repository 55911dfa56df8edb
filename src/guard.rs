//! Rendering gates over the session manager.
//!
//! Both wrappers run once when a page mounts. They only decide; routing
//! and rendering stay with the front end. Pass a [`CancellationToken`]
//! tied to the page's lifetime so a slow validation that finishes after
//! teardown is dropped instead of applied.

use tokio_util::sync::CancellationToken;

use crate::{AuthBackend, AuthError, SessionManager, SessionStore};

/// What a protected page should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    PromptSignIn,
}

/// What the public landing page should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingDecision {
    /// A valid session exists; go to the dashboard.
    RedirectToDashboard,
    /// A session existed but failed validation.
    PromptReauth,
    /// Nobody is signed in.
    ShowLanding,
}

/// Gate for protected content.
pub struct AuthGuard<'a, S: SessionStore, B: AuthBackend> {
    manager: &'a SessionManager<S, B>,
}

impl<'a, S: SessionStore, B: AuthBackend> AuthGuard<'a, S, B> {
    pub fn new(manager: &'a SessionManager<S, B>) -> Self {
        Self { manager }
    }

    pub async fn check(&self, cancel: &CancellationToken) -> Result<GuardDecision, AuthError> {
        if self.manager.get_session()?.is_none() {
            return Ok(GuardDecision::PromptSignIn);
        }

        if self.manager.validate_token(cancel).await? {
            Ok(GuardDecision::Render)
        } else {
            Ok(GuardDecision::PromptSignIn)
        }
    }
}

/// Gate for the public landing page.
pub struct LandingRedirect<'a, S: SessionStore, B: AuthBackend> {
    manager: &'a SessionManager<S, B>,
}

impl<'a, S: SessionStore, B: AuthBackend> LandingRedirect<'a, S, B> {
    pub fn new(manager: &'a SessionManager<S, B>) -> Self {
        Self { manager }
    }

    pub async fn check(&self, cancel: &CancellationToken) -> Result<LandingDecision, AuthError> {
        if self.manager.get_session()?.is_none() {
            return Ok(LandingDecision::ShowLanding);
        }

        if self.manager.validate_token(cancel).await? {
            Ok(LandingDecision::RedirectToDashboard)
        } else {
            Ok(LandingDecision::PromptReauth)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BearerToken, MemorySessionStore, MockAuthBackend, MockValidation, SessionConfig, User};

    fn manager() -> (SessionManager<MemorySessionStore, MockAuthBackend>, MockAuthBackend) {
        let backend = MockAuthBackend::new();
        let manager = SessionManager::new(
            MemorySessionStore::new(),
            backend.clone(),
            SessionConfig::default(),
        );
        (manager, backend)
    }

    fn signed_in(manager: &SessionManager<MemorySessionStore, MockAuthBackend>, backend: &MockAuthBackend) {
        let user = User::new("1", "a@b.com");
        let token = backend.issue_token(&user);
        manager.create_session(token, user).unwrap();
    }

    #[tokio::test]
    async fn test_guard_renders_valid_session() {
        let (manager, backend) = manager();
        signed_in(&manager, &backend);

        let decision = AuthGuard::new(&manager)
            .check(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(decision, GuardDecision::Render);
    }

    #[tokio::test]
    async fn test_guard_prompts_without_session() {
        let (manager, backend) = manager();

        let decision = AuthGuard::new(&manager)
            .check(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(decision, GuardDecision::PromptSignIn);
        assert_eq!(backend.validate_calls(), 0);
    }

    #[tokio::test]
    async fn test_guard_prompts_on_rejection() {
        let (manager, _) = manager();
        manager
            .create_session(BearerToken::new("revoked"), User::new("1", "a@b.com"))
            .unwrap();

        let decision = AuthGuard::new(&manager)
            .check(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(decision, GuardDecision::PromptSignIn);
        assert!(!manager.is_authenticated().unwrap());
    }

    #[tokio::test]
    async fn test_landing_decisions() {
        let (manager, backend) = manager();
        let landing = LandingRedirect::new(&manager);
        let cancel = CancellationToken::new();

        assert_eq!(landing.check(&cancel).await.unwrap(), LandingDecision::ShowLanding);

        signed_in(&manager, &backend);
        assert_eq!(
            landing.check(&cancel).await.unwrap(),
            LandingDecision::RedirectToDashboard
        );

        backend.respond_to_validate_with(MockValidation::Status(401));
        assert_eq!(landing.check(&cancel).await.unwrap(), LandingDecision::PromptReauth);
        assert_eq!(landing.check(&cancel).await.unwrap(), LandingDecision::ShowLanding);
    }

    #[tokio::test]
    async fn test_cancelled_guard_propagates() {
        let (manager, backend) = manager();
        signed_in(&manager, &backend);
        backend.respond_to_validate_with(MockValidation::Hang);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = AuthGuard::new(&manager).check(&cancel).await;
        assert_eq!(result, Err(AuthError::Cancelled));
        assert!(manager.is_authenticated().unwrap());
    }
}
