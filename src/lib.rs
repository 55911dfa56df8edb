//! Client-side session lifecycle for the AutoDig dashboard.
//!
//! The crate keeps a single authentication session in a key-value
//! [`SessionStore`], validates its bearer token against the backend and
//! gates rendering on the result.
//!
//! ```rust,ignore
//! use autodig_session::{HttpAuthBackend, MemorySessionStore, SessionConfig, SessionManager};
//! use autodig_session::config::BackendConfig;
//!
//! let backend = HttpAuthBackend::new(BackendConfig::from_env())?;
//! let manager = SessionManager::new(MemorySessionStore::new(), backend, SessionConfig::default());
//!
//! if manager.is_authenticated()? {
//!     // render the dashboard
//! }
//! ```

pub mod actions;
pub mod backend;
pub mod config;
pub mod events;
pub mod guard;
mod secret;
pub mod session;

pub use backend::{AuthBackend, AuthResponse, HttpAuthBackend, TokenStatus};
#[cfg(any(test, feature = "mocks"))]
pub use backend::{MockAuthBackend, MockValidation};
pub use config::{BackendConfig, NetworkErrorPolicy, SessionConfig, StorageKeys};
pub use events::register_event_listeners;
pub use guard::{AuthGuard, GuardDecision, LandingDecision, LandingRedirect};
pub use secret::BearerToken;
pub use session::{
    FileSessionStore, MemorySessionStore, Session, SessionManager, SessionStore, TokenCheck, User,
};
pub use tokio_util::sync::CancellationToken;

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    StorageError(String),
    NetworkError(String),
    InvalidResponse(String),
    BackendError(String),
    InvalidInput(String),
    InvalidConfig(String),
    Cancelled,
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            AuthError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            AuthError::InvalidResponse(msg) => write!(f, "Invalid backend response: {}", msg),
            AuthError::BackendError(msg) => write!(f, "{}", msg),
            AuthError::InvalidInput(msg) => write!(f, "{}", msg),
            AuthError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            AuthError::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}
