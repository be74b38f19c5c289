//! Core types for the events crate.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{Error, Result};

/// Accepted session id shape
pub const SESSION_ID_PATTERN: &str = r"^[A-Za-z0-9_-]{1,128}$";

static SESSION_ID_REGEX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(SESSION_ID_PATTERN).ok());

/// Client-chosen key grouping the events of one generation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Validate a session id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSessionId`] unless the value matches
    /// [`SESSION_ID_PATTERN`].
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let valid = SESSION_ID_REGEX
            .as_ref()
            .is_some_and(|regex| regex.is_match(&value));
        if valid {
            Ok(Self(value))
        } else {
            Err(Error::InvalidSessionId { value })
        }
    }

    /// Create a new random session id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
