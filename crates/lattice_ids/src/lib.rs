//! Shared identifier wrappers for Lattice.
//!
//! Identifiers are opaque strings. Freshly minted ones carry a short type
//! prefix (`int_…`, `lnk_…`) followed by a simple-format UUID, but anything
//! non-empty and free of whitespace parses, since ids also arrive from the
//! outside world (sentinel attributes, webhook payloads, storage).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Error returned when parsing an identifier fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError {
    message: String,
}

impl IdParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for IdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IdParseError {}

fn validate(value: &str, label: &str) -> Result<(), IdParseError> {
    if value.is_empty() {
        return Err(IdParseError::new(format!("Invalid {}: empty", label)));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(IdParseError::new(format!(
            "Invalid {}: contains whitespace: {:?}",
            label, value
        )));
    }
    Ok(())
}

macro_rules! define_prefixed_id {
    ($name:ident, $prefix:expr, $label:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new() -> Self {
                Self(format!("{}_{}", $prefix, Uuid::new_v4().simple()))
            }

            pub fn parse(value: &str) -> Result<Self, IdParseError> {
                validate(value, $label)?;
                Ok(Self(value.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                validate(&value, $label)?;
                Ok(Self(value))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_prefixed_id!(IntentId, "int", "intent ID");
define_prefixed_id!(LinkId, "lnk", "artifact link ID");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_prefixed() {
        let id = IntentId::new();
        assert!(id.as_str().starts_with("int_"));
        assert_eq!(id.as_str().len(), "int_".len() + 32);

        let link = LinkId::new();
        assert!(link.as_str().starts_with("lnk_"));
    }

    #[test]
    fn test_parse_accepts_opaque_ids() {
        let id: IntentId = "int_X".parse().unwrap();
        assert_eq!(id.as_str(), "int_X");
        assert!(IntentId::parse("legacy-42").is_ok());
    }

    #[test]
    fn test_parse_rejects_empty_and_whitespace() {
        assert!(IntentId::parse("").is_err());
        let err = IntentId::parse("int X").unwrap_err();
        assert!(err.to_string().contains("whitespace"));
    }

    #[test]
    fn test_serde_is_transparent_and_validated() {
        let id = IntentId::parse("int_abc").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"int_abc\"");

        let decoded: IntentId = serde_json::from_str("\"int_abc\"").unwrap();
        assert_eq!(decoded, id);
        assert!(serde_json::from_str::<IntentId>("\"\"").is_err());
    }
}
