//! Trip participants.
//!
//! A [`ParticipantId`] is an opaque string chosen by the caller (a username, an
//! email, a display name). Two ids are considered the same participant when
//! their [`normalized_key`](ParticipantId::normalized_key) matches, so `"Zoë"`
//! and `" zoe "` cannot both join a trip.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Creates an id from any string; surrounding whitespace is dropped.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.len() == id.len() {
            Self(id)
        } else {
            Self(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key used to detect duplicate participants.
    ///
    /// Accents are stripped, letters are lower-cased and runs of
    /// non-alphanumeric characters collapse to a single space.
    #[must_use]
    pub fn normalized_key(&self) -> String {
        normalize_key(&self.0)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ParticipantId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<ParticipantId> for String {
    fn from(value: ParticipantId) -> Self {
        value.0
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A person taking part in a trip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
        }
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

pub(crate) fn normalize_key(input: &str) -> String {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    if prev_space {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_whitespace() {
        assert_eq!(ParticipantId::new("  alice ").as_str(), "alice");
        assert!(ParticipantId::new("   ").is_empty());
    }

    #[test]
    fn deserialize_trims_like_new() {
        let id: ParticipantId = serde_json::from_str("\" bob \"").unwrap();
        assert_eq!(id.as_str(), "bob");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"bob\"");
    }

    #[test]
    fn normalized_key_folds_case_accents_and_punctuation() {
        assert_eq!(ParticipantId::from("Zoë").normalized_key(), "zoe");
        assert_eq!(
            ParticipantId::from("Mary--Jane  Smith").normalized_key(),
            "mary jane smith"
        );
        assert_eq!(ParticipantId::from("bob!").normalized_key(), "bob");
        assert_ne!(
            ParticipantId::from("bob").normalized_key(),
            ParticipantId::from("rob").normalized_key()
        );
    }
}
