mod file_store;
mod manager;
mod memory_store;
mod store;

use chrono::{DateTime, Utc};
pub use file_store::FileSessionStore;
pub use manager::{SessionManager, TokenCheck};
pub use memory_store::MemorySessionStore;
use serde::{Deserialize, Deserializer, Serialize};
pub use store::SessionStore;

use crate::BearerToken;

/// Literal values a JavaScript client writes when it serializes a missing value.
pub(crate) const CORRUPTION_MARKERS: [&str; 2] = ["undefined", "null"];

pub(crate) fn is_corruption_marker(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || CORRUPTION_MARKERS.contains(&trimmed)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_google_user: Option<bool>,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: None,
            avatar_url: None,
            is_google_user: None,
        }
    }
}

/// The backend issues numeric ids from some endpoints and string ids from others.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(n) => n.to_string(),
        Id::Uint(n) => n.to_string(),
    })
}

/// A persisted authentication session.
///
/// Serialized as `{"token": ..., "user": {...}, "expiresAt": <epoch ms>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: BearerToken,
    pub user: User,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: BearerToken, user: User, expires_at: DateTime<Utc>) -> Self {
        Self {
            token,
            user,
            expires_at,
        }
    }

    /// Expired strictly after `expires_at`.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Parses a persisted record. Anything that is not a complete session
    /// with a non-blank token is `None`.
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        if is_corruption_marker(raw) {
            return None;
        }
        serde_json::from_str::<Session>(raw)
            .ok()
            .filter(|s| !s.token.is_blank())
    }
}
