//! End-to-end behaviour of query parameters through a real server and client.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use tether::config::{ConfigFormat, ConfigLoader};
use tether::prelude::*;
use tether::telemetry::init_test_logging;
use tether_test::{Recorder, TestServer};

query_params! {
    #[derive(Debug, Clone, PartialEq)]
    struct Name {
        first: Str,
        last: Str,
    }
}

query_params! {
    #[derive(Debug, Clone, PartialEq)]
    struct Greeting {
        x: Opt<Str>,
        y: Str,
    }
}

query_params! {
    #[derive(Debug, Clone, PartialEq)]
    struct Measure {
        x: Num,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FullName {
    first: String,
    last: String,
    full: String,
}

fn name_endpoint() -> Endpoint<Name, FullName> {
    endpoint().fragment("foo").query_params::<Name, FullName>()
}

async fn name_server(calls: &Recorder<Name>) -> TestServer {
    init_test_logging();
    let seen = calls.clone();
    let route = safe_get(&name_endpoint(), move |name: Name| {
        seen.record(name.clone());
        async move {
            Ok::<_, HandlerError>(FullName {
                full: format!("{} {}", name.first, name.last),
                first: name.first,
                last: name.last,
            })
        }
    });
    TestServer::spawn([route]).await.unwrap()
}

async fn greeting_server(calls: &Recorder<Greeting>) -> TestServer {
    init_test_logging();
    let foo = endpoint().fragment("foo").query_params::<Greeting, Greeting>();
    let seen = calls.clone();
    let route = safe_get(&foo, move |greeting: Greeting| {
        seen.record(greeting.clone());
        async move { Ok::<_, HandlerError>(greeting) }
    });
    TestServer::spawn([route]).await.unwrap()
}

async fn measure_server(calls: &Recorder<Measure>) -> TestServer {
    init_test_logging();
    let foo = endpoint().fragment("foo").query_params::<Measure, Measure>();
    let seen = calls.clone();
    let route = safe_get(&foo, move |measure: Measure| {
        seen.record(measure.clone());
        async move { Ok::<_, HandlerError>(measure) }
    });
    TestServer::spawn([route]).await.unwrap()
}

#[tokio::test]
async fn test_server_decodes_required_strings() {
    let calls = Recorder::new();
    let server = name_server(&calls).await;

    let response = server.get("/foo?first=First&last=Last").await.unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(
        response.json_value().unwrap(),
        json!({"first": "First", "last": "Last", "full": "First Last"})
    );
    assert_eq!(calls.call_count(), 1);
}

#[tokio::test]
async fn test_client_matches_server() {
    let calls = Recorder::new();
    let server = name_server(&calls).await;
    let client = Client::new(server.base_url()).unwrap();

    let output = client
        .safe_get(
            &name_endpoint(),
            &Name {
                first: "First".to_string(),
                last: "Last".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(
        output,
        FullName {
            first: "First".to_string(),
            last: "Last".to_string(),
            full: "First Last".to_string(),
        }
    );

    let direct: FullName = server
        .get("/foo?first=First&last=Last")
        .await
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(output, direct);
}

#[tokio::test]
async fn test_client_drops_extraneous_fields() {
    let calls = Recorder::new();
    let server = name_server(&calls).await;
    let client = Client::new(server.base_url()).unwrap();

    let dynamic = endpoint()
        .fragment("foo")
        .query_schema::<Value, Value>(Name::schema());
    let input = json!({
        "first": "First",
        "last": "Last",
        "extraneous1": "extra",
        "extraneous2": 2,
    });

    assert_eq!(
        client.request_url(&dynamic, &input).unwrap(),
        format!("{}/foo?first=First&last=Last", server.base_url())
    );

    let output = client.safe_get(&dynamic, &input).await.unwrap();
    assert_eq!(output["full"], "First Last");
    assert_eq!(
        calls.last(),
        Some(Name {
            first: "First".to_string(),
            last: "Last".to_string(),
        })
    );
}

#[tokio::test]
async fn test_empty_string_is_present() {
    let calls = Recorder::new();
    let server = name_server(&calls).await;

    server.get("/foo?first=&last=Last").await.unwrap().assert_success();
    let name = calls.last().unwrap();
    assert_eq!(name.first, "");
    assert_eq!(name.last, "Last");

    server.get("/foo?first&last=Last").await.unwrap().assert_success();
    assert_eq!(calls.last().unwrap().first, "");
}

#[tokio::test]
async fn test_missing_required_field_rejected() {
    let calls = Recorder::new();
    let server = name_server(&calls).await;

    let response = server.get("/foo?first=First").await.unwrap();
    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("MISSING_FIELD");
    assert_eq!(response.json_value().unwrap()["error"]["field"], "last");
    assert_eq!(calls.call_count(), 0);
}

#[tokio::test]
async fn test_form_encoding_and_repeated_keys() {
    let calls = Recorder::new();
    let server = name_server(&calls).await;

    server
        .get("/foo?first=Ada+Augusta&last=King%20Lovelace&first=Other")
        .await
        .unwrap()
        .assert_success();

    let name = calls.last().unwrap();
    assert_eq!(name.first, "Ada Augusta");
    assert_eq!(name.last, "King Lovelace");
}

#[tokio::test]
async fn test_client_encodes_optional_string() {
    let calls = Recorder::new();
    let server = greeting_server(&calls).await;
    let client = Client::new(server.base_url()).unwrap();
    let foo = endpoint().fragment("foo").query_params::<Greeting, Greeting>();
    let base = server.base_url().to_string();

    let cases = [
        (Some("X"), format!("{base}/foo?x=X&y=Y")),
        (None, format!("{base}/foo?y=Y")),
        (Some(""), format!("{base}/foo?x=&y=Y")),
    ];

    for (x, expected_url) in cases {
        let input = Greeting {
            x: x.map(str::to_string),
            y: "Y".to_string(),
        };
        assert_eq!(client.request_url(&foo, &input).unwrap(), expected_url);

        let output = client.safe_get(&foo, &input).await.unwrap();
        assert_eq!(output, input);
        assert_eq!(calls.last(), Some(input));
    }
}

#[tokio::test]
async fn test_server_decodes_optional_string() {
    let calls = Recorder::new();
    let server = greeting_server(&calls).await;

    let body = server.get("/foo?y=Y").await.unwrap().json_value().unwrap();
    assert_eq!(body, json!({"x": null, "y": "Y"}));
    assert_eq!(calls.last().unwrap().x, None);

    server.get("/foo?x=&y=Y").await.unwrap().assert_success();
    assert_eq!(calls.last().unwrap().x, Some(String::new()));

    server.get("/foo?x=X&y=Y").await.unwrap().assert_success();
    assert_eq!(calls.last().unwrap().x.as_deref(), Some("X"));

    server
        .get("/foo?x=X")
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("MISSING_FIELD");
}

#[tokio::test]
async fn test_number_round_trip() {
    let calls = Recorder::new();
    let server = measure_server(&calls).await;
    let client = Client::new(server.base_url()).unwrap();
    let foo = endpoint().fragment("foo").query_params::<Measure, Measure>();

    assert_eq!(
        client.request_url(&foo, &Measure { x: 47.0 }).unwrap(),
        format!("{}/foo?x=47", server.base_url())
    );

    let body = server.get("/foo?x=47").await.unwrap().json_value().unwrap();
    assert_eq!(body["x"].as_f64(), Some(47.0));
    assert_eq!(calls.last(), Some(Measure { x: 47.0 }));

    let output = client.safe_get(&foo, &Measure { x: -0.25 }).await.unwrap();
    assert_eq!(output, Measure { x: -0.25 });
}

#[tokio::test]
async fn test_invalid_number_rejected() {
    let calls = Recorder::new();
    let server = measure_server(&calls).await;

    for query in ["/foo?x=abc", "/foo?x=", "/foo?x=NaN", "/foo?x=inf"] {
        let response = server.get(query).await.unwrap();
        response
            .assert_status(StatusCode::BAD_REQUEST)
            .assert_error_code("INVALID_NUMBER");
        assert_eq!(response.json_value().unwrap()["error"]["field"], "x");
    }

    server
        .get("/foo")
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_code("MISSING_FIELD");

    assert_eq!(calls.call_count(), 0);
}

#[tokio::test]
async fn test_client_rejects_nonconforming_dynamic_input() {
    let calls = Recorder::new();
    let server = name_server(&calls).await;
    let client = Client::new(server.base_url()).unwrap();
    let dynamic = endpoint()
        .fragment("foo")
        .query_schema::<Value, Value>(Name::schema());

    let err = client
        .safe_get(&dynamic, &json!({"first": "First"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Codec(_)));
    assert_eq!(calls.call_count(), 0);
}

#[tokio::test]
async fn test_handler_error_status() {
    let foo = endpoint().fragment("foo").query_params::<Name, FullName>();
    let route = safe_get(&foo, |name: Name| async move {
        Err::<FullName, _>(HandlerError::not_found(format!("no user {}", name.first)))
    });
    let server = TestServer::spawn([route]).await.unwrap();

    server
        .get("/foo?first=a&last=b")
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);

    let err = Client::new(server.base_url())
        .unwrap()
        .safe_get(
            &foo,
            &Name {
                first: "a".to_string(),
                last: "b".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn test_fragment_with_reserved_characters() {
    init_test_logging();
    let calls = Recorder::new();
    let fragments = ["hello world", "what?", "caf\u{e9}/100%"];

    let routes = fragments.map(|fragment| {
        let ep = endpoint().fragment(fragment).query_params::<Greeting, String>();
        let seen = calls.clone();
        safe_get(&ep, move |greeting: Greeting| {
            seen.record(greeting.y.clone());
            async move { Ok::<_, HandlerError>(format!("{fragment}: {}", greeting.y)) }
        })
    });
    let server = TestServer::spawn(routes).await.unwrap();
    let client = Client::new(server.base_url()).unwrap();

    assert_eq!(
        client
            .request_url(
                &endpoint().fragment("hello world").query_params::<Greeting, String>(),
                &Greeting {
                    x: None,
                    y: "a b".to_string(),
                },
            )
            .unwrap(),
        format!("{}/hello%20world?y=a%20b", server.base_url())
    );

    for fragment in fragments {
        let ep = endpoint().fragment(fragment).query_params::<Greeting, String>();
        let output = client
            .safe_get(
                &ep,
                &Greeting {
                    x: None,
                    y: "Y".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(output, format!("{fragment}: Y"));
    }
    assert_eq!(calls.call_count(), fragments.len());

    server
        .get("/hello%20world?y=Y")
        .await
        .unwrap()
        .assert_success();
    server
        .get("/what?y=Y")
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_from_loaded_settings() {
    let calls = Recorder::new();
    let server = name_server(&calls).await;

    let toml = format!("[client]\nbase_url = \"{}/\"\ntimeout_ms = 5000\n", server.base_url());
    let config = ConfigLoader::new()
        .with_string(&toml, ConfigFormat::Toml)
        .unwrap()
        .load()
        .unwrap();
    let client = Client::try_from(&config.client).unwrap();
    assert_eq!(client.base_url(), server.base_url());

    let output = client
        .safe_get(
            &name_endpoint(),
            &Name {
                first: "First".to_string(),
                last: "Last".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(output.full, "First Last");
    assert_eq!(calls.call_count(), 1);
}
