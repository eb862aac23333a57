//! Raw query mappings.
//!
//! [`RawQuery`] is the uninterpreted view of a URL query component: a mapping
//! from key to one or more string values. It is the boundary artifact between
//! the transport and the codec. Parsing follows
//! `application/x-www-form-urlencoded` rules, so `+` and `%20` both read as
//! a space. Serialisation percent-encodes everything but the unreserved
//! characters `A-Z a-z 0-9 - . _ ~`, writing a space as `%20`.

use indexmap::IndexMap;
use url::form_urlencoded;

/// The value(s) recorded for one query key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// The key appeared once.
    Single(String),
    /// The key appeared more than once, in order of appearance.
    Multiple(Vec<String>),
}

impl RawValue {
    /// Returns the first recorded value.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(v) => Some(v),
            Self::Multiple(vs) => vs.first().map(String::as_str),
        }
    }

    /// Iterates over all recorded values.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::Multiple(vs) => vs,
        };
        values.iter().map(String::as_str)
    }

    fn push(&mut self, value: String) {
        match self {
            Self::Single(first) => {
                let first = std::mem::take(first);
                *self = Self::Multiple(vec![first, value]);
            }
            Self::Multiple(vs) => vs.push(value),
        }
    }
}

/// An insertion-ordered mapping of query keys to raw values.
///
/// A key that is not in the mapping is *absent*. A key with an empty value,
/// written `k=` or just `k`, is *present* with the empty string.
///
/// # Example
///
/// ```
/// use tether_core::RawQuery;
///
/// let raw = RawQuery::parse("first=&last=Last&flag");
/// assert_eq!(raw.get("first"), Some(""));
/// assert_eq!(raw.get("flag"), Some(""));
/// assert_eq!(raw.get("missing"), None);
///
/// assert_eq!(raw.to_query_string(), "first=&last=Last&flag=");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawQuery {
    entries: IndexMap<String, RawValue>,
}

impl RawQuery {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Parses a query component (without the leading `?`).
    ///
    /// Percent-escapes and `+` are decoded. Repeated keys accumulate into
    /// [`RawValue::Multiple`]. Parsing never fails; malformed escapes are
    /// kept literally.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut raw = Self::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            raw.append(key.into_owned(), value.into_owned());
        }
        raw
    }

    /// Parses the query component of a URI, or returns an empty mapping.
    #[must_use]
    pub fn from_uri(uri: &http::Uri) -> Self {
        uri.query().map(Self::parse).unwrap_or_default()
    }

    /// Sets `key` to a single value, replacing anything recorded before.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(key.into(), RawValue::Single(value.into()));
    }

    /// Records another value for `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.entries.entry(key.into()) {
            indexmap::map::Entry::Occupied(mut e) => e.get_mut().push(value),
            indexmap::map::Entry::Vacant(e) => {
                e.insert(RawValue::Single(value));
            }
        }
    }

    /// Returns the first value recorded for `key`, or `None` if absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(RawValue::first)
    }

    /// Returns everything recorded for `key`.
    #[must_use]
    pub fn get_raw(&self, key: &str) -> Option<&RawValue> {
        self.entries.get(key)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no keys are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialises the mapping as a query component, without the leading `?`.
    ///
    /// Keys are written in insertion order and repeated values become
    /// repeated keys. Keys and values are percent-encoded, with a space as
    /// `%20` rather than `+`. An empty mapping yields an empty string.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.entries
            .iter()
            .flat_map(|(key, value)| {
                value
                    .iter()
                    .map(move |v| format!("{}={}", urlencoding::encode(key), urlencoding::encode(v)))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawQuery {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut raw = Self::new();
        for (key, value) in iter {
            raw.append(key, value);
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let raw = RawQuery::parse("first=First&last=Last");
        assert_eq!(raw.get("first"), Some("First"));
        assert_eq!(raw.get("last"), Some("Last"));
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn test_parse_empty_values_are_present() {
        let raw = RawQuery::parse("x=&y");
        assert!(raw.contains_key("x"));
        assert_eq!(raw.get("x"), Some(""));
        assert_eq!(raw.get("y"), Some(""));
        assert_eq!(raw.get("z"), None);
    }

    #[test]
    fn test_parse_percent_and_plus() {
        let raw = RawQuery::parse("q=rust%2Blang&name=Hello+World&s=a%20b");
        assert_eq!(raw.get("q"), Some("rust+lang"));
        assert_eq!(raw.get("name"), Some("Hello World"));
        assert_eq!(raw.get("s"), Some("a b"));
    }

    #[test]
    fn test_parse_repeated_keys() {
        let raw = RawQuery::parse("id=1&id=2&id=3");
        assert_eq!(raw.get("id"), Some("1"));
        assert_eq!(
            raw.get_raw("id"),
            Some(&RawValue::Multiple(vec![
                "1".to_string(),
                "2".to_string(),
                "3".to_string()
            ]))
        );
    }

    #[test]
    fn test_parse_empty_query() {
        assert!(RawQuery::parse("").is_empty());
    }

    #[test]
    fn test_from_uri() {
        let uri: http::Uri = "/foo?x=47".parse().unwrap();
        assert_eq!(RawQuery::from_uri(&uri).get("x"), Some("47"));

        let uri: http::Uri = "/foo".parse().unwrap();
        assert!(RawQuery::from_uri(&uri).is_empty());
    }

    #[test]
    fn test_serialize_escapes() {
        let mut raw = RawQuery::new();
        raw.insert("q", "a b&c=d");
        raw.insert("empty", "");
        assert_eq!(raw.to_query_string(), "q=a%20b%26c%3Dd&empty=");
    }

    #[test]
    fn test_serialize_space_as_percent_20() {
        let raw: RawQuery = [("full name", "Ada Lovelace"), ("op", "1+1"), ("safe", "a-b.c_d~e")]
            .into_iter()
            .collect();
        let wire = raw.to_query_string();
        assert_eq!(wire, "full%20name=Ada%20Lovelace&op=1%2B1&safe=a-b.c_d~e");
        assert_eq!(RawQuery::parse(&wire), raw);
    }

    #[test]
    fn test_serialize_repeated_keys() {
        let raw: RawQuery = [("id", "1"), ("id", "2")].into_iter().collect();
        assert_eq!(raw.to_query_string(), "id=1&id=2");
    }

    #[test]
    fn test_serialize_empty() {
        assert_eq!(RawQuery::new().to_query_string(), "");
    }

    #[test]
    fn test_insert_replaces() {
        let mut raw = RawQuery::parse("x=1&x=2");
        raw.insert("x", "3");
        assert_eq!(raw.get_raw("x"), Some(&RawValue::Single("3".to_string())));
    }

    #[test]
    fn test_parse_serialize_symmetry() {
        let original: RawQuery = [("a", "1 2"), ("b", ""), ("c", "ü&?")].into_iter().collect();
        assert_eq!(RawQuery::parse(&original.to_query_string()), original);
    }
}
