//! HTTP server.
//!
//! Built on hyper and tokio. Each accepted connection is served over
//! HTTP/1.1 on its own task; requests are matched against the
//! [`RouteTable`](crate::RouteTable) and dispatched to the mounted handler.
//!
//! # Example
//!
//! ```rust,no_run
//! use tether_core::{endpoint, NoParams};
//! use tether_server::{safe_get, HandlerError, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ping = endpoint().fragment("ping").query_params::<NoParams, String>();
//!
//!     let server = Server::builder()
//!         .http_addr("0.0.0.0:8080")
//!         .route(safe_get(&ping, |_| async { Ok::<_, HandlerError>("pong".to_string()) }))
//!         .build();
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use http::{Method, Request, Uri};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

use tether_core::RawQuery;

use crate::config::{ServerConfig, ServerConfigBuilder};
use crate::handler::{InvokeError, Route};
use crate::response::{self, HttpResponse};
use crate::router::{RouteMatch, RouteTable};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Server error types.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The configured address is not a socket address.
    #[error("invalid address '{addr}': {source}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },

    /// Failed to bind to the configured address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The Tether HTTP server.
pub struct Server {
    config: ServerConfig,
    routes: RouteTable,
}

impl Server {
    /// Creates a server with no routes.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            routes: RouteTable::new(),
        }
    }

    /// Creates a new server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the route table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Mounts a route.
    pub fn add_route(&mut self, route: Route) {
        self.routes.insert(route);
    }

    /// Runs the server until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address is invalid or cannot be
    /// bound.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals())
            .await
    }

    /// Binds the configured address and serves until `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured address is invalid or cannot be
    /// bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                source,
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// triggers, then waits up to the shutdown timeout for open connections
    /// to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(
            addr = %local_addr,
            routes = self.routes.len(),
            "Server listening on {}",
            local_addr
        );

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, shutdown).await {
                                    tracing::debug!("Connection error from {}: {}", remote_addr, e);
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }

                () = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        drop(listener);

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            "Waiting up to {:?} for {} connections to close",
            shutdown_timeout,
            tracker.active_connections()
        );

        tokio::select! {
            () = tracker.wait_idle() => {
                tracing::info!("All connections closed");
            }
            () = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    "Shutdown timeout reached, {} connections still active",
                    tracker.active_connections()
                );
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(&self);

        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(req).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle_request(&self, req: Request<Incoming>) -> HttpResponse {
        let (parts, _body) = req.into_parts();
        self.dispatch(&parts.method, &parts.uri).await
    }

    /// Routes one request and produces its response.
    pub(crate) async fn dispatch(&self, method: &Method, uri: &Uri) -> HttpResponse {
        let path = uri.path();
        tracing::debug!(http.method = %method, http.path = %path, "Request");

        let route = match self.routes.match_route(method, path) {
            RouteMatch::Found(route) => route,
            RouteMatch::MethodNotAllowed => return response::method_not_allowed(method),
            RouteMatch::NotFound => return response::not_found(path),
        };

        let raw = RawQuery::from_uri(uri);
        let outcome = tokio::time::timeout(self.config.request_timeout(), route.invoke(raw)).await;

        match outcome {
            Ok(Ok(body)) => response::json_ok(body),
            Ok(Err(InvokeError::Codec(e))) => {
                tracing::debug!(
                    endpoint = route.path(),
                    field = e.as_decode().map(|d| d.field()),
                    "Rejected query: {}",
                    e
                );
                response::codec_error(&e)
            }
            Ok(Err(InvokeError::Handler(e))) => {
                tracing::error!(endpoint = route.path(), "Handler error: {}", e);
                response::handler_error(&e)
            }
            Err(_) => {
                tracing::warn!(endpoint = route.path(), "Handler execution timed out");
                response::timeout()
            }
        }
    }
}

/// Builder for a [`Server`].
///
/// # Example
///
/// ```rust
/// use tether_server::Server;
/// use std::time::Duration;
///
/// let server = Server::builder()
///     .http_addr("127.0.0.1:9090")
///     .shutdown_timeout(Duration::from_secs(5))
///     .request_timeout(Duration::from_secs(10))
///     .build();
///
/// assert_eq!(server.config().http_addr(), "127.0.0.1:9090");
/// ```
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config_builder: ServerConfigBuilder,
    routes: RouteTable,
}

impl ServerBuilder {
    /// Creates a new server builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all settings with `config`.
    #[must_use]
    pub fn config(mut self, config: &ServerConfig) -> Self {
        self.config_builder = ServerConfigBuilder::new()
            .http_addr(config.http_addr())
            .shutdown_timeout(config.shutdown_timeout())
            .request_timeout(config.request_timeout());
        self
    }

    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.http_addr(addr);
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.shutdown_timeout(timeout);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.request_timeout(timeout);
        self
    }

    /// Mounts a route created by [`safe_get`](crate::safe_get).
    #[must_use]
    pub fn route(mut self, route: Route) -> Self {
        self.routes.insert(route);
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        Server {
            config: self.config_builder.build(),
            routes: self.routes,
        }
    }
}
