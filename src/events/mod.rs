//! Session events.
//!
//! Actions and token validation fire a [`SessionEvent`] for every outcome
//! a front end might want to react to (redirects, toasts, analytics). If
//! no listeners are registered the events are dropped.
//!
//! ```rust,ignore
//! use autodig_session::register_event_listeners;
//! use autodig_session::events::listeners::LoggingListener;
//!
//! register_event_listeners(|registry| {
//!     registry.listen(LoggingListener::new());
//! });
//! ```
//!
//! # Custom Listeners
//!
//! ```rust,ignore
//! use autodig_session::events::{Listener, SessionEvent};
//! use async_trait::async_trait;
//!
//! struct RedirectOnSignOut;
//!
//! #[async_trait]
//! impl Listener for RedirectOnSignOut {
//!     async fn handle(&self, event: &SessionEvent) {
//!         if let SessionEvent::TokenRejected { .. } = event {
//!             // navigate to "/"
//!         }
//!     }
//! }
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::SessionEvent;
pub use listener::Listener;
pub use registry::{dispatch, register_event_listeners, EventRegistry};
