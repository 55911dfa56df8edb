//! Bearer credential wrapper.
//!
//! Session tokens end up in log lines, `Debug` dumps of sessions and
//! error messages far too easily. [`BearerToken`] keeps them out.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque bearer credential issued by the backend.
///
/// `Debug` and `Display` print `[REDACTED]`. The raw value is only
/// available through [`BearerToken::expose`] and when serialized into the
/// persisted session.
///
/// ```rust
/// use autodig_session::BearerToken;
///
/// let token = BearerToken::new("abc123");
/// assert_eq!(format!("{token:?}"), "BearerToken([REDACTED])");
/// assert_eq!(token.expose(), "abc123");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw credential.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True for an empty or whitespace-only token, which the backend never issues.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

impl fmt::Display for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for BearerToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BearerToken {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Serialize for BearerToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // the persisted session and the flat mirror need the raw value
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BearerToken {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(BearerToken)
    }
}
