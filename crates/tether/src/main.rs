//! Tether demo server.
//!
//! Serves a few endpoints that show how query parameters are decoded:
//!
//! - `GET /foo?first=Ada&last=Lovelace` joins two required strings
//! - `GET /greet?y=Y[&x=X]` echoes an optional and a required string
//! - `GET /measure?x=47` echoes a number
//!
//! With `--call FIRST LAST` it acts as a client instead, calling `/foo` on
//! the configured `client.base_url` and printing the joined name.

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use tether::config::{ConfigLoader, TetherConfig};
use tether::prelude::*;
use tether::telemetry::{init_logging, LogConfig};

query_params! {
    #[derive(Debug)]
    struct Name {
        first: Str,
        last: Str,
    }
}

query_params! {
    #[derive(Debug)]
    struct Greeting {
        x: Opt<Str>,
        y: Str,
    }
}

query_params! {
    #[derive(Debug)]
    struct Measure {
        x: Num,
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FullName {
    first: String,
    last: String,
    full: String,
}

/// Command-line arguments.
struct Args {
    /// Path to configuration file.
    config: Option<PathBuf>,
    /// First and last name to send instead of serving.
    call: Option<(String, String)>,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut args = std::env::args().skip(1);
        let mut config = None;
        let mut call = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config = Some(args.next().map(PathBuf::from).context("--config needs a path")?);
                }
                "--call" => {
                    let first = args.next().context("--call needs FIRST and LAST")?;
                    let last = args.next().context("--call needs FIRST and LAST")?;
                    call = Some((first, last));
                }
                "--help" | "-h" => {
                    print_help();
                    return Ok(None);
                }
                "--version" | "-v" => {
                    println!("tether-demo {}", env!("CARGO_PKG_VERSION"));
                    return Ok(None);
                }
                other => anyhow::bail!("unknown argument: {other} (use --help for usage)"),
            }
        }

        Ok(Some(Self { config, call }))
    }
}

fn print_help() {
    println!(
        r"Tether demo server

USAGE:
    tether-demo [OPTIONS]

OPTIONS:
    -c, --config <PATH>       Path to configuration file (TOML or JSON)
        --call <FIRST> <LAST> Call /foo on client.base_url instead of serving
    -h, --help                Print help information
    -v, --version             Print version information

ENVIRONMENT VARIABLES:
    TETHER__SERVER__HTTP_ADDR              Bind address (default: 0.0.0.0:8080)
    TETHER__SERVER__SHUTDOWN_TIMEOUT_SECS  Shutdown grace period (default: 30)
    TETHER__SERVER__REQUEST_TIMEOUT_MS     Per-request timeout (default: 30000)
    TETHER__CLIENT__BASE_URL               Server called by --call (default: http://127.0.0.1:8080)
    TETHER__CLIENT__TIMEOUT_MS             Client request timeout (default: 30000)
    TETHER__LOGGING__LEVEL                 Log filter (default: info)
    TETHER__LOGGING__FORMAT                json, pretty or compact (default: json)
"
    );
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<TetherConfig> {
    let loader = match path {
        Some(path) => ConfigLoader::new()
            .with_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ConfigLoader::new().with_optional_file("tether.toml")?,
    };
    Ok(loader.with_env_prefix("TETHER").load()?)
}

fn foo() -> Endpoint<Name, FullName> {
    endpoint().fragment("foo").query_params::<Name, FullName>()
}

fn routes() -> Vec<Route> {
    let foo = foo();
    let greet = endpoint().fragment("greet").query_params::<Greeting, Greeting>();
    let measure = endpoint().fragment("measure").query_params::<Measure, Measure>();

    vec![
        safe_get(&foo, |name: Name| async move {
            Ok::<_, HandlerError>(FullName {
                full: format!("{} {}", name.first, name.last),
                first: name.first,
                last: name.last,
            })
        }),
        safe_get(&greet, |greeting: Greeting| async move { Ok::<_, HandlerError>(greeting) }),
        safe_get(&measure, |measure: Measure| async move { Ok::<_, HandlerError>(measure) }),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(args) = Args::parse()? else {
        return Ok(());
    };

    let config = load_config(args.config.as_ref())?;
    init_logging(&LogConfig::from(&config.logging))?;

    if let Some((first, last)) = args.call {
        let client = Client::try_from(&config.client).context("invalid client settings")?;
        info!(base_url = client.base_url(), "Calling /foo");
        let output = client
            .safe_get(&foo(), &Name { first, last })
            .await
            .context("request failed")?;
        println!("{}", output.full);
        return Ok(());
    }

    info!(addr = %config.server.http_addr, "Starting tether-demo v{}", env!("CARGO_PKG_VERSION"));

    let mut server = Server::new(ServerConfig::from(&config.server));
    for route in routes() {
        server.add_route(route);
    }

    server.run().await.context("server error")?;
    Ok(())
}
