//! Subject ID - the identity of the principal owning a session

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of an authenticated principal (a user account)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SubjectId(i64);

impl SubjectId {
    /// Create a new SubjectId from a raw i64 value
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Parse from string representation (as carried in the `sub` claim)
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse::<i64>()
            .map(SubjectId)
            .map_err(|_| IdParseError::InvalidFormat)
    }
}

/// Error when parsing an identifier from its string form
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("invalid identifier format")]
    InvalidFormat,
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SubjectId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<SubjectId> for i64 {
    fn from(id: SubjectId) -> Self {
        id.0
    }
}

impl std::str::FromStr for SubjectId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubjectId::parse(s)
    }
}

// Serialize as string for JSON (JavaScript BigInt safety)
impl Serialize for SubjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for SubjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct SubjectIdVisitor;

        impl Visitor<'_> for SubjectIdVisitor {
            type Value = SubjectId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer subject id")
            }

            fn visit_i64<E>(self, value: i64) -> Result<SubjectId, E>
            where
                E: de::Error,
            {
                Ok(SubjectId(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<SubjectId, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(SubjectId)
                    .map_err(|_| de::Error::custom("subject id out of range"))
            }

            fn visit_str<E>(self, value: &str) -> Result<SubjectId, E>
            where
                E: de::Error,
            {
                SubjectId::parse(value).map_err(|_| de::Error::custom("invalid subject id string"))
            }
        }

        deserializer.deserialize_any(SubjectIdVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        let id = SubjectId::parse("42").unwrap();
        assert_eq!(id.into_inner(), 42);
        assert_eq!(id.to_string(), "42");
        assert!(SubjectId::parse("forty-two").is_err());
    }

    #[test]
    fn test_serialize_as_string() {
        let json = serde_json::to_string(&SubjectId::new(123_456_789_012)).unwrap();
        assert_eq!(json, "\"123456789012\"");
    }

    #[test]
    fn test_deserialize_string_or_number() {
        let a: SubjectId = serde_json::from_str("\"77\"").unwrap();
        let b: SubjectId = serde_json::from_str("77").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_deserialize_rejects_overflow() {
        let result: Result<SubjectId, _> = serde_json::from_str("18446744073709551615");
        assert!(result.is_err());
    }
}
