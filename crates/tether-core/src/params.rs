//! Typed projection of field schemas.
//!
//! A [`FieldSchema`] is a runtime value. [`QueryParams`] ties one to a Rust
//! record type so that handlers receive, and clients send, ordinary structs.
//! The marker types [`Str`], [`Num`] and [`Opt`] describe a field once and
//! yield both its [`TypeRep`] and its Rust value type:
//!
//! | marker | [`TypeRep`] | Rust type |
//! |---|---|---|
//! | [`Str`] | `string` | `String` |
//! | [`Num`] | `number` | `f64` |
//! | [`Opt<K>`] | `option<K>` | `Option<K::Value>` |
//!
//! The [`query_params!`](crate::query_params) macro declares a record and its
//! schema from a single list of markers, so the two cannot drift apart.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::schema::FieldSchema;
use crate::type_rep::TypeRep;

/// A type-level description of one query parameter.
pub trait Describe {
    /// The Rust type a handler sees for this parameter.
    type Value: Serialize + DeserializeOwned;

    /// The runtime representation of this parameter.
    fn type_rep() -> TypeRep;
}

/// Marker for a `string` parameter.
#[derive(Debug, Clone, Copy)]
pub enum Str {}

/// Marker for a `number` parameter.
#[derive(Debug, Clone, Copy)]
pub enum Num {}

/// Marker for an `option<K>` parameter.
#[derive(Debug, Clone, Copy)]
pub struct Opt<K>(PhantomData<K>);

impl Describe for Str {
    type Value = String;

    fn type_rep() -> TypeRep {
        TypeRep::string()
    }
}

impl Describe for Num {
    type Value = f64;

    fn type_rep() -> TypeRep {
        TypeRep::number()
    }
}

impl<K: Describe> Describe for Opt<K> {
    type Value = Option<K::Value>;

    fn type_rep() -> TypeRep {
        TypeRep::option(K::type_rep())
    }
}

/// A record type whose fields are query parameters.
///
/// Usually implemented by [`query_params!`](crate::query_params). A manual
/// implementation must keep [`QueryParams::schema`] in step with the serde
/// representation of the type:
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use tether_core::{FieldSchema, QueryParams, TypeRep};
///
/// #[derive(Serialize, Deserialize)]
/// struct Paging {
///     limit: u32,
///     cursor: Option<String>,
/// }
///
/// impl QueryParams for Paging {
///     fn schema() -> FieldSchema {
///         FieldSchema::new()
///             .field("limit", TypeRep::number())
///             .field("cursor", TypeRep::option(TypeRep::string()))
///     }
/// }
/// ```
pub trait QueryParams: Serialize + DeserializeOwned {
    /// Returns the field schema for this record.
    fn schema() -> FieldSchema;
}

/// The empty parameter record.
///
/// Endpoints declared with `NoParams` accept any query and send none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoParams {}

impl QueryParams for NoParams {
    fn schema() -> FieldSchema {
        FieldSchema::new()
    }
}

/// Declares a query parameter record together with its [`QueryParams`] impl.
///
/// Each field is written with a marker type ([`Str`], [`Num`], [`Opt`]); the
/// generated struct holds the corresponding Rust types. The calling crate must
/// depend on `serde`.
///
/// # Example
///
/// ```
/// use tether_core::{query_params, Opt, QueryParams, Str};
///
/// query_params! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Greeting {
///         pub x: Opt<Str>,
///         pub y: Str,
///     }
/// }
///
/// let greeting = Greeting { x: None, y: "Y".to_string() };
/// assert_eq!(greeting.y, "Y");
/// assert_eq!(Greeting::schema().to_string(), "{x: option<string>, y: string}");
/// ```
#[macro_export]
macro_rules! query_params {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $kind:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(::serde::Serialize, ::serde::Deserialize)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: <$kind as $crate::Describe>::Value,
            )*
        }

        impl $crate::QueryParams for $name {
            fn schema() -> $crate::FieldSchema {
                $crate::FieldSchema::new()
                    $(.field(stringify!($field), <$kind as $crate::Describe>::type_rep()))*
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_typed, encode_typed};
    use crate::raw::RawQuery;

    query_params! {
        #[derive(Debug, Clone, PartialEq)]
        struct Person {
            first: Str,
            last: Str,
        }
    }

    query_params! {
        #[derive(Debug, PartialEq)]
        struct Measure {
            x: Num,
            y: Opt<Num>,
            label: Opt<Str>,
        }
    }

    #[test]
    fn test_marker_reps() {
        assert_eq!(Str::type_rep(), TypeRep::String);
        assert_eq!(Num::type_rep(), TypeRep::Number);
        assert_eq!(
            <Opt<Opt<Str>>>::type_rep(),
            TypeRep::option(TypeRep::option(TypeRep::string()))
        );
    }

    #[test]
    fn test_macro_schema_matches_fields() {
        let schema = Person::schema();
        assert_eq!(schema.names().collect::<Vec<_>>(), ["first", "last"]);
        assert_eq!(Measure::schema().to_string(), "{x: number, y: option<number>, label: option<string>}");
    }

    #[test]
    fn test_macro_record_decodes() {
        let raw = RawQuery::parse("first=First&last=Last&foo=Bar");
        let person: Person = decode_typed(&Person::schema(), &raw).unwrap();
        assert_eq!(
            person,
            Person {
                first: "First".to_string(),
                last: "Last".to_string(),
            }
        );
    }

    #[test]
    fn test_macro_record_with_optionals() {
        let raw = RawQuery::parse("x=47&label=");
        let measure: Measure = decode_typed(&Measure::schema(), &raw).unwrap();
        assert_eq!(
            measure,
            Measure {
                x: 47.0,
                y: None,
                label: Some(String::new()),
            }
        );

        let encoded = encode_typed(&Measure::schema(), &measure).unwrap();
        assert_eq!(encoded.to_query_string(), "x=47&label=");
    }

    #[test]
    fn test_no_params() {
        assert!(NoParams::schema().is_empty());
        let decoded: NoParams = decode_typed(&NoParams::schema(), &RawQuery::parse("foo=bar")).unwrap();
        assert_eq!(decoded, NoParams {});
        assert!(encode_typed(&NoParams::schema(), &NoParams {}).unwrap().is_empty());
    }
}
