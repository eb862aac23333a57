//! The query codec.
//!
//! [`decode_all`] and [`encode_all`] apply a [`FieldSchema`] to a
//! [`RawQuery`] or to a dynamic [`Record`]. The typed variants
//! [`decode_typed`] and [`encode_typed`] bridge to serde types through the
//! same two functions, so client encode and server decode always agree on
//! the edge cases.
//!
//! Guarantees:
//!
//! - `decode_all(s, &encode_all(s, r)?)? == r` once `null` entries in `r`
//!   are dropped.
//! - Keys in the raw query that `s` does not declare are ignored.
//! - Keys in the record that `s` does not declare are never emitted.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{json_type_name, CodecError, DecodeResult, EncodeError};
use crate::raw::RawQuery;
use crate::schema::FieldSchema;

/// A decoded query: field name to JSON value.
///
/// An absent optional field has no entry. Decoding never produces `null`.
pub type Record = serde_json::Map<String, Value>;

/// Decodes every schema field from a raw query.
///
/// Fails on the first field that does not decode; the error names that
/// field. Repeated keys contribute their first value.
///
/// # Example
///
/// ```
/// use tether_core::{decode_all, FieldSchema, RawQuery, TypeRep};
/// use serde_json::json;
///
/// let schema = FieldSchema::new()
///     .field("first", TypeRep::string())
///     .field("last", TypeRep::string());
///
/// let raw = RawQuery::parse("first=First&last=Last&foo=Bar");
/// let record = decode_all(&schema, &raw).unwrap();
///
/// assert_eq!(json!(record), json!({"first": "First", "last": "Last"}));
/// ```
///
/// # Errors
///
/// Returns the first [`DecodeError`](crate::DecodeError) raised by a field.
pub fn decode_all(schema: &FieldSchema, raw: &RawQuery) -> DecodeResult<Record> {
    let mut record = Record::new();
    for (name, rep) in schema.iter() {
        if let Some(value) = rep.decode(name, raw.get(name))? {
            record.insert(name.to_owned(), value);
        }
    }
    Ok(record)
}

/// Encodes the schema fields of a record into a raw query.
///
/// Keys are emitted in schema order. Absent or `null` optional fields are
/// omitted; fields the schema does not declare are dropped.
///
/// # Example
///
/// ```
/// use tether_core::{encode_all, FieldSchema, TypeRep};
/// use serde_json::json;
///
/// let schema = FieldSchema::new()
///     .field("x", TypeRep::option(TypeRep::string()))
///     .field("y", TypeRep::string());
///
/// let record = json!({"x": null, "y": "Y"});
/// let raw = encode_all(&schema, record.as_object().unwrap()).unwrap();
///
/// assert_eq!(raw.to_query_string(), "y=Y");
/// ```
///
/// # Errors
///
/// Returns an [`EncodeError`] if a required field is absent or a value has
/// the wrong JSON type.
pub fn encode_all(schema: &FieldSchema, record: &Record) -> Result<RawQuery, EncodeError> {
    let mut raw = RawQuery::new();
    for (name, rep) in schema.iter() {
        if let Some(encoded) = rep.encode(name, record.get(name))? {
            raw.insert(name, encoded);
        }
    }
    Ok(raw)
}

/// Encodes an arbitrary JSON value, which must be a record.
///
/// `null` is accepted as the empty record for an empty schema.
///
/// # Errors
///
/// Returns [`EncodeError::NotARecord`] for non-object values, otherwise
/// whatever [`encode_all`] returns.
pub fn encode_value(schema: &FieldSchema, value: &Value) -> Result<RawQuery, EncodeError> {
    match value {
        Value::Object(record) => encode_all(schema, record),
        Value::Null if schema.is_empty() => Ok(RawQuery::new()),
        other => Err(EncodeError::NotARecord {
            found: json_type_name(other),
        }),
    }
}

/// Decodes a raw query into a serde type.
///
/// Absent optional fields are presented to serde as `null`, so they land in
/// `Option` fields as `None`.
///
/// # Errors
///
/// - [`CodecError::Decode`] if a field fails to decode
/// - [`CodecError::Shape`] if the decoded record does not deserialize into `T`
pub fn decode_typed<T: DeserializeOwned>(schema: &FieldSchema, raw: &RawQuery) -> Result<T, CodecError> {
    let mut record = decode_all(schema, raw)?;
    for name in schema.names() {
        if !record.contains_key(name) {
            record.insert(name.to_owned(), Value::Null);
        }
    }
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Encodes a serde type into a raw query.
///
/// # Errors
///
/// - [`CodecError::Shape`] if `input` cannot be represented as JSON
/// - [`CodecError::Encode`] if the JSON does not conform to the schema
pub fn encode_typed<T: Serialize + ?Sized>(schema: &FieldSchema, input: &T) -> Result<RawQuery, CodecError> {
    let value = serde_json::to_value(input)?;
    Ok(encode_value(schema, &value)?)
}
