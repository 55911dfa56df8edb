use chrono::{DateTime, Utc};

/// Events fired by the session client.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    // sign-in
    LoginSucceeded {
        user_id: String,
        email: String,
        at: DateTime<Utc>,
    },
    LoginFailed {
        email: String,
        reason: String,
        at: DateTime<Utc>,
    },
    SignupSucceeded {
        email: String,
        at: DateTime<Utc>,
    },
    GoogleSignInSucceeded {
        user_id: String,
        email: String,
        at: DateTime<Utc>,
    },
    LogoutSucceeded {
        user_id: Option<String>,
        at: DateTime<Utc>,
    },

    // validation
    TokenValidated {
        user_id: String,
        at: DateTime<Utc>,
    },
    TokenRejected {
        user_id: String,
        reason: String,
        at: DateTime<Utc>,
    },
    SessionRetainedOffline {
        user_id: String,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Dot-separated event name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoginSucceeded { .. } => "session.login.success",
            Self::LoginFailed { .. } => "session.login.failed",
            Self::SignupSucceeded { .. } => "session.signup.success",
            Self::GoogleSignInSucceeded { .. } => "session.google.success",
            Self::LogoutSucceeded { .. } => "session.logout.success",
            Self::TokenValidated { .. } => "session.token.validated",
            Self::TokenRejected { .. } => "session.token.rejected",
            Self::SessionRetainedOffline { .. } => "session.token.retained_offline",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::LoginSucceeded { at, .. }
            | Self::LoginFailed { at, .. }
            | Self::SignupSucceeded { at, .. }
            | Self::GoogleSignInSucceeded { at, .. }
            | Self::LogoutSucceeded { at, .. }
            | Self::TokenValidated { at, .. }
            | Self::TokenRejected { at, .. }
            | Self::SessionRetainedOffline { at, .. } => *at,
        }
    }

    /// Whether this event leaves the client signed out.
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            Self::LogoutSucceeded { .. } | Self::TokenRejected { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let now = Utc::now();

        assert_eq!(
            SessionEvent::LoginSucceeded {
                user_id: "1".to_owned(),
                email: "a@b.com".to_owned(),
                at: now
            }
            .name(),
            "session.login.success"
        );
        assert_eq!(
            SessionEvent::LoginFailed {
                email: "a@b.com".to_owned(),
                reason: "Invalid email or password".to_owned(),
                at: now
            }
            .name(),
            "session.login.failed"
        );
        assert_eq!(
            SessionEvent::TokenRejected {
                user_id: "1".to_owned(),
                reason: "HTTP 401".to_owned(),
                at: now
            }
            .name(),
            "session.token.rejected"
        );
        assert_eq!(
            SessionEvent::SessionRetainedOffline {
                user_id: "1".to_owned(),
                at: now
            }
            .name(),
            "session.token.retained_offline"
        );
    }

    #[test]
    fn test_event_timestamp() {
        let now = Utc::now();
        let event = SessionEvent::TokenValidated {
            user_id: "1".to_owned(),
            at: now,
        };
        assert_eq!(event.timestamp(), now);
    }

    #[test]
    fn test_ends_session() {
        let now = Utc::now();
        assert!(SessionEvent::LogoutSucceeded { user_id: None, at: now }.ends_session());
        assert!(!SessionEvent::TokenValidated {
            user_id: "1".to_owned(),
            at: now
        }
        .ends_session());
    }
}
