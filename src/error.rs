//! Error types for evidence loading and timestamp parsing.

use thiserror::Error;

/// Errors raised when a raw record cannot be turned into typed evidence.
///
/// Every variant that gets far enough to see a discriminator value keeps it,
/// so a failing record can be traced back from the message alone.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Record is not a JSON object")]
    NotAnObject,

    #[error("Missing discriminator: expected `event_type` or `observation_type`")]
    MissingDiscriminator,

    #[error("Discriminator `{key}` must be a string, got {found}")]
    InvalidDiscriminator { key: &'static str, found: String },

    #[error("Unknown {key}: {value:?}")]
    UnknownType { key: &'static str, value: String },

    #[error("Invalid {key} {value:?} record: {source}")]
    Invalid {
        key: &'static str,
        value: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "Inconsistent repository in {key} {value:?} record: \
         full_name {full_name:?} does not match owner {owner:?} / name {name:?}"
    )]
    InconsistentRepository {
        key: &'static str,
        value: String,
        owner: String,
        name: String,
        full_name: String,
    },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// The discriminator value of the offending record, if one was read.
    pub fn discriminator(&self) -> Option<&str> {
        match self {
            Self::UnknownType { value, .. }
            | Self::Invalid { value, .. }
            | Self::InconsistentRepository { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// A string matched none of the recognized timestamp patterns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized timestamp: {value:?}")]
pub struct ParseError {
    pub value: String,
}

impl ParseError {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_names_value() {
        let err = SchemaError::UnknownType {
            key: "event_type",
            value: "not_a_real_type".to_string(),
        };
        assert!(err.to_string().contains("not_a_real_type"));
        assert_eq!(err.discriminator(), Some("not_a_real_type"));
    }

    #[test]
    fn test_missing_discriminator_has_no_value() {
        assert_eq!(SchemaError::MissingDiscriminator.discriminator(), None);
    }

    #[test]
    fn test_parse_error_message() {
        let err = ParseError::new("garbage");
        assert_eq!(err.to_string(), "Unrecognized timestamp: \"garbage\"");
    }
}
