//! The HTTP client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use tether_core::Endpoint;

use crate::error::{ClientError, ClientResult};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Calls Tether endpoints on one server.
///
/// The client encodes inputs with the endpoint's schema, so what it sends is
/// exactly what a server mounted on the same endpoint decodes.
///
/// # Example
///
/// ```rust
/// use tether_client::Client;
/// use tether_core::{endpoint, query_params, Opt, Str};
///
/// query_params! {
///     pub struct Greeting {
///         pub x: Opt<Str>,
///         pub y: Str,
///     }
/// }
///
/// let foo = endpoint().fragment("foo").query_params::<Greeting, String>();
/// let client = Client::new("http://localhost:8080/").unwrap();
///
/// let url = client
///     .request_url(&foo, &Greeting { x: None, y: "Y".into() })
///     .unwrap();
/// assert_eq!(url, "http://localhost:8080/foo?y=Y");
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base: Url,
    base_url: String,
}

impl Client {
    /// Creates a client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute `http` or `https` URL without query or fragment.
    pub fn new(base_url: impl AsRef<str>) -> ClientResult<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Same as [`Client::new`], or [`ClientError::Transport`] if the HTTP
    /// client cannot be constructed.
    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> ClientResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_http_client(base_url, http)
    }

    /// Creates a client on top of an existing `reqwest` client.
    ///
    /// # Errors
    ///
    /// Same as [`Client::new`].
    pub fn with_http_client(base_url: impl AsRef<str>, http: reqwest::Client) -> ClientResult<Self> {
        let base = validate_base_url(base_url.as_ref())?;
        let base_url = base.as_str().trim_end_matches('/').to_string();
        Ok(Self { http, base, base_url })
    }

    /// Returns the base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request URL for calling `endpoint` with `input`.
    ///
    /// The result is the base URL, the endpoint path with each segment
    /// percent-encoded and, when any parameter is emitted, `?` followed by
    /// the encoded query.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Codec`] if `input` does not conform to the
    /// endpoint schema.
    pub fn request_url<I: Serialize, O>(&self, endpoint: &Endpoint<I, O>, input: &I) -> ClientResult<String> {
        let query = endpoint.query_string(input)?;

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::invalid_base_url(self.base.as_str(), "URL cannot carry a path"))?
            .pop_if_empty()
            .extend(endpoint.segments());
        if !query.is_empty() {
            url.set_query(Some(&query));
        }
        Ok(url.into())
    }

    /// Calls `endpoint` with `input` and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Codec`] if `input` does not conform to the schema
    /// - [`ClientError::Transport`] if the request fails
    /// - [`ClientError::Status`] if the server answers with a non-2xx status
    /// - [`ClientError::Body`] if the body does not decode into `O`
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use serde::Deserialize;
    /// use tether_client::{Client, ClientResult};
    /// use tether_core::{endpoint, query_params, Str};
    ///
    /// query_params! {
    ///     pub struct Name {
    ///         pub first: Str,
    ///         pub last: Str,
    ///     }
    /// }
    ///
    /// #[derive(Deserialize)]
    /// struct FullName {
    ///     full: String,
    /// }
    ///
    /// async fn full_name(client: &Client) -> ClientResult<String> {
    ///     let foo = endpoint().fragment("foo").query_params::<Name, FullName>();
    ///     let input = Name { first: "Ada".into(), last: "Lovelace".into() };
    ///     let output: FullName = client.safe_get(&foo, &input).await?;
    ///     Ok(output.full)
    /// }
    /// ```
    ///
    /// The result is typed by the endpoint, so binding it to anything other
    /// than `O` does not compile:
    ///
    /// ```compile_fail
    /// use serde::Deserialize;
    /// use tether_client::{Client, ClientResult};
    /// use tether_core::{endpoint, query_params, Str};
    ///
    /// query_params! {
    ///     pub struct Name {
    ///         pub first: Str,
    ///         pub last: Str,
    ///     }
    /// }
    ///
    /// #[derive(Deserialize)]
    /// struct FullName {
    ///     full: String,
    /// }
    ///
    /// async fn full_name(client: &Client) -> ClientResult<String> {
    ///     let foo = endpoint().fragment("foo").query_params::<Name, FullName>();
    ///     let input = Name { first: "Ada".into(), last: "Lovelace".into() };
    ///     let output: String = client.safe_get(&foo, &input).await?;
    ///     Ok(output)
    /// }
    /// ```
    pub async fn safe_get<I, O>(&self, endpoint: &Endpoint<I, O>, input: &I) -> ClientResult<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let url = self.request_url(endpoint, input)?;
        tracing::debug!(http.method = "GET", http.url = %url, "Outgoing request");

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(http.url = %url, http.status = status.as_u16(), "Request failed");
            return Err(ClientError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ClientError::Body)
    }
}

/// Calls `endpoint` on the server at `base_url`.
///
/// Builds a one-off [`Client`]; prefer a shared client for repeated calls.
///
/// # Errors
///
/// Same as [`Client::new`] and [`Client::safe_get`].
pub async fn safe_get<I, O>(base_url: &str, endpoint: &Endpoint<I, O>, input: &I) -> ClientResult<O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    Client::new(base_url)?.safe_get(endpoint, input).await
}

fn validate_base_url(raw: &str) -> ClientResult<Url> {
    let url = Url::parse(raw).map_err(|e| ClientError::invalid_base_url(raw, e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::invalid_base_url(
            raw,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() || url.host().is_none() {
        return Err(ClientError::invalid_base_url(raw, "URL has no host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ClientError::invalid_base_url(
            raw,
            "base URL must not have a query or fragment",
        ));
    }

    Ok(url)
}
