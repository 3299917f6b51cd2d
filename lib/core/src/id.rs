//! Strongly-typed identifiers.
//!
//! Internal users are keyed by the numeric id assigned by the backend
//! identity service. The front end never mints these ids; it only carries
//! the value it was handed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Identifier of an internal user record owned by the backend.
///
/// Serializes as a bare JSON number, matching the backend wire format.
/// The string form is the plain decimal rendering, which is what session
/// tokens and pages carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalUserId(i64);

impl InternalUserId {
    /// Wraps a backend-assigned id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for InternalUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InternalUserId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| ParseIdError {
                id_type: "InternalUserId",
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_plain_decimal() {
        assert_eq!(InternalUserId::new(42).to_string(), "42");
    }

    #[test]
    fn parse_roundtrips_display() {
        let id = InternalUserId::new(9001);
        let parsed: InternalUserId = id.to_string().parse().expect("should parse");
        assert_eq!(parsed, id);
    }

    #[test]
    fn parse_rejects_non_numeric() {
        let err = "usr_abc".parse::<InternalUserId>().unwrap_err();
        assert_eq!(err.id_type, "InternalUserId");
    }

    #[test]
    fn serializes_as_json_number() {
        let json = serde_json::to_string(&InternalUserId::new(7)).expect("serialize");
        assert_eq!(json, "7");
        let parsed: InternalUserId = serde_json::from_str("7").expect("deserialize");
        assert_eq!(parsed.get(), 7);
    }
}
