//! Error types for the query codec.
//!
//! Decoding has exactly two failure modes, both carrying the name of the
//! failing field:
//!
//! | Error | Cause | HTTP status |
//! |---|---|---|
//! | [`DecodeError::MissingField`] | required field absent from the query | 400 |
//! | [`DecodeError::InvalidNumber`] | `number` field present but unparseable | 400 |
//!
//! Encoding a value that conforms to its schema never fails. [`EncodeError`]
//! only surfaces when a dynamic record does not match the declared shape.

use http::StatusCode;
use thiserror::Error;

/// Result type alias for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// A query parameter could not be decoded.
///
/// # Example
///
/// ```
/// use tether_core::DecodeError;
/// use http::StatusCode;
///
/// let err = DecodeError::missing_field("first");
/// assert_eq!(err.field(), "first");
/// assert_eq!(err.code(), "MISSING_FIELD");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A required field has no value in the query.
    #[error("missing required query parameter '{field}'")]
    MissingField {
        /// Name of the missing field.
        field: String,
    },

    /// A `number` field is present but is not a finite base-10 number.
    #[error("query parameter '{field}' is not a valid number: {raw:?}")]
    InvalidNumber {
        /// Name of the field.
        field: String,
        /// The raw value as received.
        raw: String,
    },
}

impl DecodeError {
    /// Creates a [`DecodeError::MissingField`].
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates a [`DecodeError::InvalidNumber`].
    #[must_use]
    pub fn invalid_number(field: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::InvalidNumber {
            field: field.into(),
            raw: raw.into(),
        }
    }

    /// Returns the name of the field that failed to decode.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::MissingField { field } | Self::InvalidNumber { field, .. } => field,
        }
    }

    /// Returns a stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::InvalidNumber { .. } => "INVALID_NUMBER",
        }
    }

    /// Returns the HTTP status a server should answer with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

/// A record could not be encoded against its schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A non-optional field has no value, or its value is `null`.
    #[error("missing value for required query parameter '{field}'")]
    MissingField {
        /// Name of the field.
        field: String,
    },

    /// A field holds a value of the wrong JSON type.
    #[error("query parameter '{field}' expects {expected}, found {found}")]
    TypeMismatch {
        /// Name of the field.
        field: String,
        /// The declared type, e.g. `option<string>`.
        expected: String,
        /// JSON type of the offending value.
        found: &'static str,
    },

    /// The value being encoded is not a record.
    #[error("query parameters must be a record, found {found}")]
    NotARecord {
        /// JSON type of the offending value.
        found: &'static str,
    },
}

/// Error from the typed bridge between Rust records and raw queries.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Decoding the raw query failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Encoding the record failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The serde representation of the record disagrees with its schema.
    #[error("query parameters do not match the declared shape: {0}")]
    Shape(#[from] serde_json::Error),
}

impl CodecError {
    /// Returns the underlying decode error, if any.
    #[must_use]
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

/// A field schema was declared incorrectly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two fields share a name.
    #[error("duplicate query parameter '{0}' in schema")]
    DuplicateField(String),
}

/// Returns the JSON type name of a value, for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = DecodeError::missing_field("last");
        assert_eq!(err.to_string(), "missing required query parameter 'last'");
        assert_eq!(err.field(), "last");
    }

    #[test]
    fn test_invalid_number_carries_raw_value() {
        let err = DecodeError::invalid_number("x", "forty-seven");
        assert_eq!(err.code(), "INVALID_NUMBER");
        assert_eq!(err.field(), "x");
        assert!(err.to_string().contains("\"forty-seven\""));
    }

    #[test]
    fn test_decode_errors_are_client_errors() {
        assert!(DecodeError::missing_field("a").status_code().is_client_error());
        assert!(DecodeError::invalid_number("a", "b")
            .status_code()
            .is_client_error());
    }

    #[test]
    fn test_codec_error_from_decode() {
        let err: CodecError = DecodeError::missing_field("y").into();
        assert_eq!(err.as_decode().map(DecodeError::field), Some("y"));
        assert_eq!(err.to_string(), "missing required query parameter 'y'");
    }

    #[test]
    fn test_encode_type_mismatch_display() {
        let err = EncodeError::TypeMismatch {
            field: "x".to_string(),
            expected: "number".to_string(),
            found: "string",
        };
        assert_eq!(
            err.to_string(),
            "query parameter 'x' expects number, found string"
        );
    }

    #[test]
    fn test_json_type_name() {
        assert_eq!(json_type_name(&serde_json::json!(null)), "null");
        assert_eq!(json_type_name(&serde_json::json!(1)), "number");
        assert_eq!(json_type_name(&serde_json::json!({})), "object");
    }
}
