//! Ephemeral test server.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use tether_server::{Route, Server, ServerError, ShutdownSignal};

use crate::error::TestError;
use crate::response::TestResponse;

/// A real server bound to `127.0.0.1` on a free port.
///
/// The server runs on a background task and is told to shut down when the
/// `TestServer` is dropped.
///
/// # Example
///
/// ```rust,no_run
/// use tether_core::{endpoint, NoParams};
/// use tether_server::{safe_get, HandlerError};
/// use tether_test::TestServer;
///
/// # async fn demo() -> Result<(), tether_test::TestError> {
/// let ping = endpoint().fragment("ping").query_params::<NoParams, String>();
/// let server = TestServer::spawn([safe_get(&ping, |_| async {
///     Ok::<_, HandlerError>("pong".to_string())
/// })])
/// .await?;
///
/// let response = server.get("/ping").await?;
/// assert_eq!(response.json::<String>()?, "pong");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    base_url: String,
    http: reqwest::Client,
    shutdown: ShutdownSignal,
    task: Option<JoinHandle<Result<(), ServerError>>>,
}

impl TestServer {
    /// Starts a server with default configuration serving `routes`.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Bind`] if no local port is available.
    pub async fn spawn(routes: impl IntoIterator<Item = Route>) -> Result<Self, TestError> {
        let mut server = Server::builder().build();
        for route in routes {
            server.add_route(route);
        }
        Self::start(server).await
    }

    /// Starts a fully configured server. Its configured address is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::Bind`] if no local port is available.
    pub async fn start(server: Server) -> Result<Self, TestError> {
        let listener = TcpListener::bind("127.0.0.1:0").await.map_err(TestError::Bind)?;
        let addr = listener.local_addr().map_err(TestError::Bind)?;
        let shutdown = ShutdownSignal::new();
        let task = tokio::spawn(server.serve(listener, shutdown.clone()));

        Ok(Self {
            addr,
            base_url: format!("http://{addr}"),
            http: reqwest::Client::new(),
            shutdown,
            task: Some(task),
        })
    }

    /// Returns the bound address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns `http://127.0.0.1:<port>`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins the base URL with a path and optional query.
    #[must_use]
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}/{}", self.base_url, path_and_query.trim_start_matches('/'))
    }

    /// Sends a `GET` for `path_and_query`, e.g. `"/foo?x=47"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body read.
    pub async fn get(&self, path_and_query: &str) -> Result<TestResponse, TestError> {
        self.request(reqwest::Method::GET, path_and_query).await
    }

    /// Sends a request with an arbitrary method.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the body read.
    pub async fn request(&self, method: reqwest::Method, path_and_query: &str) -> Result<TestResponse, TestError> {
        let response = self.http.request(method, self.url(path_and_query)).send().await?;
        TestResponse::from_reqwest(response).await
    }

    /// Shuts the server down and waits for it to stop.
    ///
    /// # Errors
    ///
    /// Returns the server's own error, or [`TestError::Join`] if its task
    /// panicked.
    pub async fn shutdown(mut self) -> Result<(), TestError> {
        self.shutdown.trigger();
        match self.task.take() {
            Some(task) => Ok(task.await??),
            None => Ok(()),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use tether_core::{endpoint, query_params, NoParams, Str};
    use tether_server::{safe_get, HandlerError};

    query_params! {
        #[derive(Debug)]
        struct Greeting {
            name: Str,
        }
    }

    fn routes() -> Vec<Route> {
        let ping = endpoint().fragment("ping").query_params::<NoParams, String>();
        let hello = endpoint().fragment("hello").query_params::<Greeting, String>();
        vec![
            safe_get(&ping, |_| async { Ok::<_, HandlerError>("pong".to_string()) }),
            safe_get(&hello, |g: Greeting| async move { Ok::<_, HandlerError>(format!("hello {}", g.name)) }),
        ]
    }

    #[tokio::test]
    async fn test_spawn_and_get() {
        let server = TestServer::spawn(routes()).await.unwrap();
        assert!(server.base_url().starts_with("http://127.0.0.1:"));
        assert_ne!(server.addr().port(), 0);

        let response = server.get("/ping").await.unwrap();
        response.assert_success();
        assert_eq!(response.json::<String>().unwrap(), "pong");

        let response = server.get("hello?name=Ada+L").await.unwrap();
        assert_eq!(response.json::<String>().unwrap(), "hello Ada L");

        server.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_error_responses() {
        let server = TestServer::spawn(routes()).await.unwrap();

        server
            .get("/hello")
            .await
            .unwrap()
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_error_code("MISSING_FIELD");

        server
            .get("/nowhere")
            .await
            .unwrap()
            .assert_status(StatusCode::NOT_FOUND);

        server
            .request(reqwest::Method::POST, "/ping")
            .await
            .unwrap()
            .assert_status(StatusCode::METHOD_NOT_ALLOWED)
            .assert_header("allow", "GET");
    }

    #[tokio::test]
    async fn test_url_joining() {
        let server = TestServer::spawn(Vec::new()).await.unwrap();
        assert_eq!(server.url("/a?x=1"), format!("{}/a?x=1", server.base_url()));
        assert_eq!(server.url("a"), format!("{}/a", server.base_url()));
    }
}
