//! Field schemas.
//!
//! A [`FieldSchema`] names the query parameters of an endpoint and gives each
//! one a [`TypeRep`]. Declaration order is preserved: it is the order in
//! which parameters are written onto the wire and listed in diagnostics.

use std::fmt;

use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::type_rep::TypeRep;

/// An ordered mapping from unique field names to [`TypeRep`]s.
///
/// # Example
///
/// ```
/// use tether_core::{FieldSchema, TypeRep};
///
/// let schema = FieldSchema::new()
///     .field("x", TypeRep::option(TypeRep::string()))
///     .field("y", TypeRep::string());
///
/// assert_eq!(schema.len(), 2);
/// assert_eq!(schema.names().collect::<Vec<_>>(), ["x", "y"]);
/// assert_eq!(schema.to_string(), "{x: option<string>, y: string}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    fields: IndexMap<String, TypeRep>,
}

impl FieldSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    /// Adds a field, returning the extended schema.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already declared. Use [`FieldSchema::try_field`]
    /// for schemas assembled from untrusted input.
    #[must_use]
    pub fn field(self, name: impl Into<String>, rep: TypeRep) -> Self {
        match self.try_field(name, rep) {
            Ok(schema) => schema,
            Err(e) => panic!("{e}"),
        }
    }

    /// Adds a field, rejecting duplicate names.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateField`] if `name` is already declared.
    pub fn try_field(mut self, name: impl Into<String>, rep: TypeRep) -> Result<Self, SchemaError> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(SchemaError::DuplicateField(name));
        }
        self.fields.insert(name, rep);
        Ok(self)
    }

    /// Looks up the representation of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeRep> {
        self.fields.get(name)
    }

    /// Returns `true` if the field is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterates over fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeRep)> {
        self.fields.iter().map(|(name, rep)| (name.as_str(), rep))
    }

    /// Iterates over field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no fields are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, rep)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {rep}")?;
        }
        write!(f, "}}")
    }
}

impl<'a> IntoIterator for &'a FieldSchema {
    type Item = (&'a String, &'a TypeRep);
    type IntoIter = indexmap::map::Iter<'a, String, TypeRep>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
