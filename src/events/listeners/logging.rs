use async_trait::async_trait;

use crate::events::{Listener, SessionEvent};

/// Logs every session event through the `log` crate.
///
/// Events that end a session are logged at `Warn` regardless of the
/// configured level, so sign-outs stay visible at default filters.
pub struct LoggingListener {
    level: log::Level,
}

impl LoggingListener {
    pub fn new() -> Self {
        Self {
            level: log::Level::Info,
        }
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }

    fn level_for(&self, event: &SessionEvent) -> log::Level {
        if event.ends_session() {
            self.level.min(log::Level::Warn)
        } else {
            self.level
        }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Listener for LoggingListener {
    async fn handle(&self, event: &SessionEvent) {
        log::log!(
            target: "autodig_session::events",
            self.level_for(event),
            "event={} {:?}",
            event.name(),
            event
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(LoggingListener::default().level, log::Level::Info);
    }

    #[test]
    fn test_session_ending_events_escalate() {
        let listener = LoggingListener::with_level(log::Level::Debug);
        let logout = SessionEvent::LogoutSucceeded {
            user_id: Some("1".to_owned()),
            at: Utc::now(),
        };
        let validated = SessionEvent::TokenValidated {
            user_id: "1".to_owned(),
            at: Utc::now(),
        };

        assert_eq!(listener.level_for(&logout), log::Level::Warn);
        assert_eq!(listener.level_for(&validated), log::Level::Debug);
    }

    #[test]
    fn test_error_level_is_not_lowered() {
        let listener = LoggingListener::with_level(log::Level::Error);
        let logout = SessionEvent::LogoutSucceeded {
            user_id: None,
            at: Utc::now(),
        };
        assert_eq!(listener.level_for(&logout), log::Level::Error);
    }

    #[tokio::test]
    async fn test_handle_does_not_panic() {
        let listener = LoggingListener::new();
        listener
            .handle(&SessionEvent::SignupSucceeded {
                email: "a@b.com".to_owned(),
                at: Utc::now(),
            })
            .await;
    }
}
