//! Route table.
//!
//! Endpoints are matched on their exact path. Request paths arrive
//! percent-encoded and are decoded before lookup, so `/hello%20world`
//! reaches an endpoint declared with `fragment("hello world")`. Only `GET`
//! is served; any other method on a known path is reported separately so
//! the server can answer `405` instead of `404`.
//!
//! ```rust
//! use tether_core::{endpoint, NoParams};
//! use tether_server::{safe_get, HandlerError, RouteMatch, RouteTable};
//! use http::Method;
//!
//! let ping = endpoint().fragment("ping").query_params::<NoParams, String>();
//!
//! let mut table = RouteTable::new();
//! table.insert(safe_get(&ping, |_| async { Ok::<_, HandlerError>("pong".to_string()) }));
//!
//! assert!(matches!(table.match_route(&Method::GET, "/ping"), RouteMatch::Found(_)));
//! assert!(matches!(table.match_route(&Method::POST, "/ping"), RouteMatch::MethodNotAllowed));
//! assert!(matches!(table.match_route(&Method::GET, "/pong"), RouteMatch::NotFound));
//! ```

use std::collections::HashMap;

use http::Method;

use crate::handler::Route;

/// Outcome of looking up a request in the [`RouteTable`].
#[derive(Debug)]
pub enum RouteMatch<'a> {
    /// A route serves this path and method.
    Found(&'a Route),
    /// A route serves this path, but not with this method.
    MethodNotAllowed,
    /// No route serves this path.
    NotFound,
}

/// Routes keyed by path.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, Route>,
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route, replacing any route already mounted on the same path.
    pub fn insert(&mut self, route: Route) {
        let path = route.path().to_string();
        if self.routes.insert(path.clone(), route).is_some() {
            tracing::warn!(http.path = %path, "Replaced an existing route");
        }
    }

    /// Looks up a request by its path as sent on the wire.
    ///
    /// Percent-escapes are decoded first. A path that does not decode to
    /// UTF-8 matches nothing. A trailing slash is ignored, so `/foo/`
    /// matches a route on `/foo`.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        let Ok(decoded) = urlencoding::decode(path) else {
            return RouteMatch::NotFound;
        };
        let Some(route) = self.routes.get(normalize(&decoded)) else {
            return RouteMatch::NotFound;
        };
        if *method == Method::GET {
            RouteMatch::Found(route)
        } else {
            RouteMatch::MethodNotAllowed
        }
    }

    /// Returns `true` if a route is mounted on `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(normalize(path))
    }

    /// Iterates over mounted paths in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn normalize(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{safe_get, HandlerError};
    use tether_core::{endpoint, NoParams};

    fn route(path: &str) -> Route {
        let ep = endpoint().fragment(path).query_params::<NoParams, String>();
        safe_get(&ep, |_| async { Ok::<_, HandlerError>(String::new()) })
    }

    #[test]
    fn test_exact_match() {
        let mut table = RouteTable::new();
        table.insert(route("api/users"));

        assert!(matches!(
            table.match_route(&Method::GET, "/api/users"),
            RouteMatch::Found(r) if r.path() == "/api/users"
        ));
        assert!(matches!(
            table.match_route(&Method::GET, "/api"),
            RouteMatch::NotFound
        ));
        assert!(matches!(
            table.match_route(&Method::GET, "/api/users/1"),
            RouteMatch::NotFound
        ));
    }

    #[test]
    fn test_trailing_slash() {
        let mut table = RouteTable::new();
        table.insert(route("foo"));
        assert!(matches!(
            table.match_route(&Method::GET, "/foo/"),
            RouteMatch::Found(_)
        ));
        assert!(table.contains("/foo/"));
    }

    #[test]
    fn test_root_route() {
        let mut table = RouteTable::new();
        table.insert(route("/"));
        assert!(matches!(
            table.match_route(&Method::GET, "/"),
            RouteMatch::Found(_)
        ));
    }

    #[test]
    fn test_percent_encoded_path() {
        let mut table = RouteTable::new();
        table.insert(route("hello world"));
        table.insert(route("what?"));
        table.insert(route("caf\u{e9}/100%"));

        for path in ["/hello%20world", "/hello%20world/", "/what%3F", "/caf%C3%A9/100%25"] {
            assert!(
                matches!(table.match_route(&Method::GET, path), RouteMatch::Found(_)),
                "no match for {path}"
            );
        }
        assert!(matches!(
            table.match_route(&Method::GET, "/what"),
            RouteMatch::NotFound
        ));
        assert!(matches!(
            table.match_route(&Method::GET, "/caf%E9/100%25"),
            RouteMatch::NotFound
        ));
    }

    #[test]
    fn test_method_not_allowed() {
        let mut table = RouteTable::new();
        table.insert(route("foo"));
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            assert!(matches!(
                table.match_route(&method, "/foo"),
                RouteMatch::MethodNotAllowed
            ));
        }
    }

    #[test]
    fn test_insert_replaces() {
        let mut table = RouteTable::new();
        table.insert(route("foo"));
        table.insert(route("/foo/"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.paths().collect::<Vec<_>>(), ["/foo"]);
    }

    #[test]
    fn test_empty() {
        let table = RouteTable::new();
        assert!(table.is_empty());
        assert!(matches!(
            table.match_route(&Method::GET, "/"),
            RouteMatch::NotFound
        ));
    }
}
