//! End-to-end scenarios against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port and drives `Client` through a
//! small ureq-backed `Transport` defined here. Validates that request
//! building and response classification work over real HTTP.

use std::collections::HashMap;

use jadugar_core::{
    Client, ClientConfig, Headers, HttpMethod, HttpRequest, HttpResponse, Platform, RequestOptions,
    Transport, TransportFailure,
};
use serde::Deserialize;
use serde_json::Value;

/// Disables ureq's status-as-error behavior so 4xx/5xx responses come back
/// as data and the core does the status interpretation.
struct UreqTransport(ureq::Agent);

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self(agent)
    }
}

impl Transport for UreqTransport {
    fn send(&self, req: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let result = match (req.method, req.body.as_deref()) {
            (HttpMethod::Post, Some(body)) => {
                let mut builder = self.0.post(req.url.as_str());
                for (k, v) in req.headers.iter() {
                    builder = builder.header(k, v);
                }
                builder.send(body.as_bytes())
            }
            (HttpMethod::Get, None) => {
                let mut builder = self.0.get(req.url.as_str());
                for (k, v) in req.headers.iter() {
                    builder = builder.header(k, v);
                }
                builder.call()
            }
            (method, _) => panic!("test transport does not handle {method}"),
        };
        let mut response = result.map_err(|e| TransportFailure::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.body_mut().read_to_string().ok();
        Ok(HttpResponse { status, headers, body })
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Counter {
    value: i64,
}

#[derive(Debug, Deserialize)]
struct Echo {
    method: String,
    headers: HashMap<String, String>,
    body: String,
}

fn client(config: ClientConfig) -> Client<UreqTransport> {
    Client::new(config, UreqTransport::new())
}

fn local_config() -> ClientConfig {
    let addr = mock_server::spawn().unwrap();
    ClientConfig::new(&format!("http://{addr}"), Platform::Ios)
}

#[test]
fn success_decodes_typed_value() {
    let c = client(local_config());
    let counter: Counter = c.request("/value", RequestOptions::new()).unwrap();
    assert_eq!(counter, Counter { value: 1 });
}

#[test]
fn server_envelope_becomes_normalized_error() {
    let c = client(local_config());
    let err = c.request::<Counter>("/missing", RequestOptions::new()).unwrap_err();
    assert_eq!(err.status(), 404);
    assert_eq!(err.code(), "NOT_FOUND");
    assert_eq!(err.title(), "Missing");
}

#[test]
fn unparsable_success_body_is_decode_error() {
    let c = client(local_config());
    let err = c.request::<Counter>("/garbage", RequestOptions::new()).unwrap_err();
    assert_eq!(err.code(), "DECODE_ERROR");
    assert_eq!(err.status(), 500);
}

#[test]
fn connection_refused_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let c = client(ClientConfig::new(&format!("http://{addr}"), Platform::Ios));
    let err = c.request::<Counter>("/value", RequestOptions::new()).unwrap_err();
    assert_eq!(err.code(), "NETWORK_ERROR");
    assert_eq!(err.status(), 500);
    assert!(err.detail().is_some());
}

#[test]
fn guidance_reaches_the_caller() {
    let c = client(local_config());
    let err = c.request::<Counter>("/guided", RequestOptions::new()).unwrap_err();
    assert_eq!(err.status(), 409);
    assert_eq!(err.code(), "SPELL_CONFLICT");
    assert_eq!(err.id(), Some("err-guided-1"));
    assert_eq!(err.error_source().unwrap()["pointer"], "/data/attributes/name");
    assert!(err.handling_guide().is_some());
    assert!(err.recovery_suggestion().is_none());
}

#[test]
fn non_json_error_page_is_parse_error() {
    let c = client(local_config());
    let err = c.request::<Counter>("/html-error", RequestOptions::new()).unwrap_err();
    assert_eq!(err.code(), "PARSE_ERROR");
    assert_eq!(err.status(), 502);
}

#[test]
fn empty_errors_is_http_error() {
    let c = client(local_config());
    let err = c.request::<Counter>("/empty-errors", RequestOptions::new()).unwrap_err();
    assert_eq!(err.code(), "HTTP_ERROR");
    assert_eq!(err.status(), 500);
}

#[test]
fn no_content_is_decode_error() {
    let c = client(local_config());
    let err = c.request::<Value>("/no-content", RequestOptions::new()).unwrap_err();
    assert_eq!(err.code(), "DECODE_ERROR");
    assert_eq!(err.status(), 500);
}

#[test]
fn standard_headers_reach_the_server() {
    let c = client(local_config().with_api_key("k-live").with_version("2.0.0"));
    let options = RequestOptions::new()
        .method(HttpMethod::Post)
        .body(r#"{"spell":"lumos"}"#)
        .header("X-Trace", "t-9");
    let echo: Echo = c.request("/echo", options).unwrap();

    assert_eq!(echo.method, "POST");
    assert_eq!(echo.body, r#"{"spell":"lumos"}"#);
    assert_eq!(echo.headers["content-type"], "application/json");
    assert_eq!(echo.headers["x-client-platform"], "ios");
    assert_eq!(echo.headers["x-client-version"], "2.0.0");
    assert_eq!(echo.headers["authorization"], "Bearer k-live");
    assert_eq!(echo.headers["x-trace"], "t-9");
    assert_eq!(echo.headers["x-request-id"].len(), 36);
}

#[test]
fn missing_api_key_sends_no_authorization() {
    let c = client(local_config());
    let echo: Value = c.request("/echo", RequestOptions::new()).unwrap();
    assert!(echo["headers"].get("authorization").is_none());
}
