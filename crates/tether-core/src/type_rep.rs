//! Runtime type representations.
//!
//! A [`TypeRep`] describes how one logical value maps to and from a single
//! query-string value. The set of kinds is closed:
//!
//! | kind | decode (`None` = absent) | encode (`None` = omit) |
//! |---|---|---|
//! | `string` | value as-is, `""` included; absent is `MissingField` | value as-is |
//! | `number` | finite base-10 number; absent is `MissingField`, garbage is `InvalidNumber` | canonical decimal |
//! | `option<T>` | absent decodes to absent; otherwise delegates to `T` | `null`/absent omit; otherwise delegates to `T` |
//!
//! Empty string is always a present value, never absence.
//!
//! # Example
//!
//! ```
//! use tether_core::TypeRep;
//! use serde_json::json;
//!
//! let rep = TypeRep::option(TypeRep::string());
//!
//! assert_eq!(rep.decode("x", None).unwrap(), None);
//! assert_eq!(rep.decode("x", Some("")).unwrap(), Some(json!("")));
//!
//! assert_eq!(rep.encode("x", Some(&json!(null))).unwrap(), None);
//! assert_eq!(rep.encode("x", Some(&json!(""))).unwrap(), Some(String::new()));
//! ```

use std::fmt;

use serde_json::{Number, Value};

use crate::error::{json_type_name, DecodeError, DecodeResult, EncodeError};

/// Largest integer an IEEE-754 double holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// The kind tag of a [`TypeRep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A string value.
    String,
    /// A numeric value.
    Number,
    /// An optional wrapper around another kind.
    Option,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Option => write!(f, "option"),
        }
    }
}

/// Describes the shape of one query parameter.
///
/// `TypeRep` values are immutable and cheap to clone; one instance may be
/// shared by any number of schemas and endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRep {
    /// `string`
    String,
    /// `number`
    Number,
    /// `option<T>`
    Option(Box<TypeRep>),
}

impl TypeRep {
    /// The `string` representation.
    #[must_use]
    pub const fn string() -> Self {
        Self::String
    }

    /// The `number` representation.
    #[must_use]
    pub const fn number() -> Self {
        Self::Number
    }

    /// The `option<T>` representation wrapping `inner`.
    #[must_use]
    pub fn option(inner: TypeRep) -> Self {
        Self::Option(Box::new(inner))
    }

    /// Returns the kind tag.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::String => Kind::String,
            Self::Number => Kind::Number,
            Self::Option(_) => Kind::Option,
        }
    }

    /// Returns the wrapped representation of an `option`.
    #[must_use]
    pub fn inner(&self) -> Option<&TypeRep> {
        match self {
            Self::Option(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns `true` if an absent value is acceptable.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Option(_))
    }

    /// Decodes a raw query value.
    ///
    /// `raw` is `None` when the key is absent from the query. The result is
    /// `Ok(None)` only for an absent `option`; decode never produces `null`.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::MissingField`] if a non-optional value is absent
    /// - [`DecodeError::InvalidNumber`] if a `number` is not parseable
    pub fn decode(&self, field: &str, raw: Option<&str>) -> DecodeResult<Option<Value>> {
        match self {
            Self::String => raw
                .map(|s| Some(Value::String(s.to_owned())))
                .ok_or_else(|| DecodeError::missing_field(field)),
            Self::Number => {
                let raw = raw.ok_or_else(|| DecodeError::missing_field(field))?;
                parse_number(raw)
                    .map(Some)
                    .ok_or_else(|| DecodeError::invalid_number(field, raw))
            }
            Self::Option(inner) => match raw {
                None => Ok(None),
                Some(_) => inner.decode(field, raw),
            },
        }
    }

    /// Encodes a value into its raw query form.
    ///
    /// `value` is `None` when the record has no entry for the field. Returns
    /// `Ok(None)` when the parameter must be omitted, which happens only for
    /// an `option` whose value is absent or `null`.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::MissingField`] if a non-optional value is absent or `null`
    /// - [`EncodeError::TypeMismatch`] if the value has the wrong JSON type
    pub fn encode(&self, field: &str, value: Option<&Value>) -> Result<Option<String>, EncodeError> {
        match (self, value) {
            (Self::Option(_), None | Some(Value::Null)) => Ok(None),
            (Self::Option(inner), Some(_)) => inner.encode(field, value),
            (_, None | Some(Value::Null)) => Err(EncodeError::MissingField {
                field: field.to_owned(),
            }),
            (Self::String, Some(Value::String(s))) => Ok(Some(s.clone())),
            (Self::Number, Some(Value::Number(n))) => Ok(Some(format_number(n))),
            (_, Some(other)) => Err(EncodeError::TypeMismatch {
                field: field.to_owned(),
                expected: self.to_string(),
                found: json_type_name(other),
            }),
        }
    }
}

impl fmt::Display for TypeRep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Option(inner) => write!(f, "option<{inner}>"),
        }
    }
}

/// Parses a finite base-10 number.
///
/// Integer literals are read exactly as `i64` or `u64` first, so values
/// beyond 2^53 keep every digit. Other integral values in the
/// exactly-representable range also become JSON integers so they
/// deserialize into integer fields as well as floats.
fn parse_number(raw: &str) -> Option<Value> {
    if let Ok(i) = raw.parse::<i64>() {
        return Some(Value::from(i));
    }
    if let Ok(u) = raw.parse::<u64>() {
        return Some(Value::from(u));
    }
    let n: f64 = raw.parse().ok()?;
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        #[allow(clippy::cast_possible_truncation)]
        return Some(Value::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number)
}

/// Canonical decimal form: integers without a fractional part, other values
/// in shortest round-tripping notation.
fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            #[allow(clippy::cast_possible_truncation)]
            let i = f as i64;
            i.to_string()
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
