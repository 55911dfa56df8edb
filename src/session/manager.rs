//! The session manager.
//!
//! Owns the single persisted session: the primary JSON record under
//! `keys.session` plus the deprecated flat mirrors under `keys.token` and
//! `keys.user`. Expiry is computed on read; nothing marks a session as
//! expired in storage.

use chrono::{DateTime, Duration, Utc};
use tokio_util::sync::CancellationToken;

use super::store::SessionStore;
use super::{is_corruption_marker, Session, User, CORRUPTION_MARKERS};
use crate::backend::{AuthBackend, TokenStatus};
use crate::config::{max_session_lifetime, NetworkErrorPolicy, SessionConfig};
use crate::events::{dispatch, SessionEvent};
use crate::{AuthError, BearerToken};

/// Detailed result of a token check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCheck {
    /// Nothing to validate; no request was sent.
    NoSession,
    /// The backend accepted the token and the session was extended.
    Valid,
    /// The backend rejected the token and the session was cleared.
    Rejected { status: u16 },
    /// The backend could not be reached. `retained` tells whether the
    /// session survived, per [`NetworkErrorPolicy`].
    Unreachable { retained: bool },
}

impl TokenCheck {
    /// Whether the caller may keep treating the user as signed in.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid | Self::Unreachable { retained: true })
    }
}

/// Creates, reads, refreshes, validates and destroys the client session.
///
/// # Example
///
/// ```rust,ignore
/// use autodig_session::{CancellationToken, MemorySessionStore, SessionConfig, SessionManager};
///
/// let manager = SessionManager::new(store, backend, SessionConfig::default());
/// manager.create_session(token, user)?;
///
/// let cancel = CancellationToken::new();
/// if manager.validate_token(&cancel).await? {
///     // still signed in, expiry pushed out another 24 hours
/// }
/// ```
#[derive(Clone)]
pub struct SessionManager<S: SessionStore, B: AuthBackend> {
    store: S,
    backend: B,
    config: SessionConfig,
}

/// `now + lifetime`, truncated to the millisecond precision it is persisted with.
fn expiry_from(now: DateTime<Utc>, lifetime: Duration) -> Result<DateTime<Utc>, AuthError> {
    let at = now.checked_add_signed(lifetime).ok_or_else(|| {
        AuthError::InvalidConfig("session lifetime overflows the calendar".to_owned())
    })?;
    Ok(DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at))
}

impl<S: SessionStore, B: AuthBackend> SessionManager<S, B> {
    pub fn new(store: S, backend: B, config: SessionConfig) -> Self {
        Self {
            store,
            backend,
            config,
        }
    }

    /// Like [`new`](Self::new) but rejects an invalid config.
    pub fn try_new(store: S, backend: B, config: SessionConfig) -> Result<Self, AuthError> {
        config.validate()?;
        Ok(Self::new(store, backend, config))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Persists a new session expiring one lifetime from now, along with
    /// the flat token and user mirrors. Any previous session is overwritten.
    pub fn create_session(&self, token: BearerToken, user: User) -> Result<Session, AuthError> {
        let expires_at = expiry_from(Utc::now(), self.config.lifetime)?;
        let session = Session::new(token, user, expires_at);

        let user_json = serde_json::to_string(&session.user)
            .map_err(|e| AuthError::StorageError(format!("Failed to serialize user: {e}")))?;

        self.write_session(&session)?;
        self.store
            .set(&self.config.keys.token, session.token.expose())?;
        self.store.set(&self.config.keys.user, &user_json)?;

        log::info!(
            target: "autodig_session",
            "msg=\"session created\" user_id=\"{}\" expires_at=\"{}\"",
            session.user.id,
            session.expires_at.to_rfc3339()
        );

        Ok(session)
    }

    fn write_session(&self, session: &Session) -> Result<(), AuthError> {
        let json = serde_json::to_string(session)
            .map_err(|e| AuthError::StorageError(format!("Failed to serialize session: {e}")))?;
        self.store.set(&self.config.keys.session, &json)
    }

    /// Reads the persisted session.
    ///
    /// Returns `None` when nothing is stored. A corrupted or expired record
    /// also yields `None`, after purging every session key.
    pub fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(raw) = self.store.get(&self.config.keys.session)? else {
            return Ok(None);
        };

        let Some(session) = Session::parse(&raw) else {
            log::warn!(
                target: "autodig_session",
                "msg=\"corrupted session purged\" bytes={}",
                raw.len()
            );
            self.clear_session()?;
            return Ok(None);
        };

        let now = Utc::now();
        // no session written by this crate expires past the longest lifetime;
        // the minute absorbs the refresh bump and clock jitter
        let horizon = now
            .checked_add_signed(max_session_lifetime() + Duration::minutes(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        if session.expires_at > horizon {
            log::warn!(
                target: "autodig_session",
                "msg=\"session with implausible expiry purged\" user_id=\"{}\" expires_at=\"{}\"",
                session.user.id,
                session.expires_at.to_rfc3339()
            );
            self.clear_session()?;
            return Ok(None);
        }

        if session.is_expired_at(now) {
            log::info!(
                target: "autodig_session",
                "msg=\"session expired\" user_id=\"{}\" expired_at=\"{}\"",
                session.user.id,
                session.expires_at.to_rfc3339()
            );
            self.clear_session()?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Removes the session, both mirrors and the transient user record.
    /// Safe to call when nothing is stored.
    ///
    /// Every key is attempted even if an earlier removal fails; the first
    /// failure is returned.
    pub fn clear_session(&self) -> Result<(), AuthError> {
        let mut first_error = None;
        for key in self.config.keys.all() {
            if let Err(e) = self.store.remove(key) {
                log::warn!(
                    target: "autodig_session",
                    "msg=\"failed to remove session key\" key=\"{}\" error=\"{}\"",
                    key,
                    e
                );
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                log::debug!(target: "autodig_session", "msg=\"session cleared\"");
                Ok(())
            }
        }
    }

    pub fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.get_session()?.is_some())
    }

    /// Deletes session, user and token keys holding a literal `"undefined"`
    /// or `"null"`. Returns how many keys were removed.
    pub fn cleanup_corrupted_data(&self) -> Result<usize, AuthError> {
        let keys = &self.config.keys;
        let mut removed = 0;

        for key in [&keys.session, &keys.user, &keys.token] {
            if let Some(raw) = self.store.get(key)? {
                if CORRUPTION_MARKERS.contains(&raw.trim()) {
                    self.store.remove(key)?;
                    removed += 1;
                    log::warn!(
                        target: "autodig_session",
                        "msg=\"corruption marker removed\" key=\"{}\"",
                        key
                    );
                }
            }
        }

        Ok(removed)
    }

    /// The signed-in user.
    ///
    /// Prefers the valid session's user. Without a session, falls back to
    /// the legacy flat user record, deleting it if it does not parse.
    pub fn get_current_user(&self) -> Result<Option<User>, AuthError> {
        self.cleanup_corrupted_data()?;

        if let Some(session) = self.get_session()? {
            return Ok(Some(session.user));
        }

        let key = &self.config.keys.user;
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };

        if is_corruption_marker(&raw) {
            self.store.remove(key)?;
            return Ok(None);
        }

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => {
                log::debug!(
                    target: "autodig_session",
                    "msg=\"user read from legacy record\" user_id=\"{}\"",
                    user.id
                );
                Ok(Some(user))
            }
            Err(e) => {
                log::warn!(
                    target: "autodig_session",
                    "msg=\"corrupted user record purged\" error=\"{}\"",
                    e
                );
                self.store.remove(key)?;
                Ok(None)
            }
        }
    }

    /// Pushes a valid session's expiry to one lifetime from now without
    /// contacting the backend. The new expiry is always later than the old
    /// one. No-op without a session.
    pub fn refresh_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(mut session) = self.get_session()? else {
            return Ok(None);
        };

        let extended = expiry_from(Utc::now(), self.config.lifetime)?;
        let Some(bumped) = session
            .expires_at
            .checked_add_signed(Duration::milliseconds(1))
        else {
            self.clear_session()?;
            return Ok(None);
        };
        session.expires_at = extended.max(bumped);
        self.write_session(&session)?;

        log::debug!(
            target: "autodig_session",
            "msg=\"session refreshed\" user_id=\"{}\" expires_at=\"{}\"",
            session.user.id,
            session.expires_at.to_rfc3339()
        );

        Ok(Some(session))
    }

    /// Validates the session token with the backend.
    ///
    /// `false` without a session (no request is sent), after a rejection, and
    /// after a network failure under [`NetworkErrorPolicy::Clear`].
    ///
    /// # Errors
    ///
    /// [`AuthError::Cancelled`] if `cancel` fires before the backend answers;
    /// storage is left untouched. Storage failures propagate.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "validate_token", skip_all, err)
    )]
    pub async fn validate_token(&self, cancel: &CancellationToken) -> Result<bool, AuthError> {
        Ok(self.check_token(cancel).await?.is_valid())
    }

    /// Same as [`validate_token`](Self::validate_token) with the detailed outcome.
    pub async fn check_token(&self, cancel: &CancellationToken) -> Result<TokenCheck, AuthError> {
        let Some(session) = self.get_session()? else {
            return Ok(TokenCheck::NoSession);
        };
        let user_id = session.user.id.clone();

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                log::debug!(target: "autodig_session", "msg=\"token validation cancelled\"");
                return Err(AuthError::Cancelled);
            }
            response = self.backend.validate(&session.token) => response,
        };

        match response {
            Ok(TokenStatus::Valid) => {
                self.refresh_session()?;
                dispatch(SessionEvent::TokenValidated {
                    user_id,
                    at: Utc::now(),
                })
                .await;
                Ok(TokenCheck::Valid)
            }
            Ok(TokenStatus::Rejected { status }) => {
                log::info!(
                    target: "autodig_session",
                    "msg=\"token rejected\" user_id=\"{}\" status={}",
                    user_id,
                    status
                );
                self.clear_session()?;
                dispatch(SessionEvent::TokenRejected {
                    user_id,
                    reason: format!("HTTP {status}"),
                    at: Utc::now(),
                })
                .await;
                Ok(TokenCheck::Rejected { status })
            }
            Err(e) => self.on_unreachable(user_id, e).await,
        }
    }

    async fn on_unreachable(&self, user_id: String, error: AuthError) -> Result<TokenCheck, AuthError> {
        match self.config.network_error_policy {
            NetworkErrorPolicy::Clear => {
                log::warn!(
                    target: "autodig_session",
                    "msg=\"token validation failed, signing out\" user_id=\"{}\" error=\"{}\"",
                    user_id,
                    error
                );
                self.clear_session()?;
                dispatch(SessionEvent::TokenRejected {
                    user_id,
                    reason: error.to_string(),
                    at: Utc::now(),
                })
                .await;
                Ok(TokenCheck::Unreachable { retained: false })
            }
            NetworkErrorPolicy::Retain => {
                log::warn!(
                    target: "autodig_session",
                    "msg=\"token validation failed, keeping session\" user_id=\"{}\" error=\"{}\"",
                    user_id,
                    error
                );
                dispatch(SessionEvent::SessionRetainedOffline {
                    user_id,
                    at: Utc::now(),
                })
                .await;
                Ok(TokenCheck::Unreachable { retained: true })
            }
        }
    }
}
