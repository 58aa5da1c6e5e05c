use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// `{"errors": [...]}` body returned by failing Jadugar endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub errors: Vec<ErrorObject>,
}

impl ErrorEnvelope {
    pub fn single(error: ErrorObject) -> Self {
        Self { errors: vec![error] }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub status: String,
    pub code: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ErrorMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_specific: Option<PlatformSpecific>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpecific {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handling_guide: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_suggestion: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub value: i64,
}

pub fn app() -> Router {
    Router::new()
        .route("/value", get(value))
        .route("/missing", get(missing))
        .route("/guided", get(guided))
        .route("/garbage", get(garbage))
        .route("/html-error", get(html_error))
        .route("/empty-errors", get(empty_errors))
        .route("/no-content", get(no_content))
        .route("/echo", any(echo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve `app()` on a random local port from a background thread with its
/// own runtime. Returns the bound address.
pub fn spawn() -> std::io::Result<SocketAddr> {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = std_listener.local_addr()?;
    std_listener.set_nonblocking(true)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    std::thread::spawn(move || {
        rt.block_on(async move {
            let served = match TcpListener::from_std(std_listener) {
                Ok(listener) => run(listener).await,
                Err(err) => Err(err),
            };
            if let Err(err) = served {
                tracing::error!(%err, "mock server stopped");
            }
        })
    });
    Ok(addr)
}

async fn value() -> Json<Counter> {
    Json(Counter { value: 1 })
}

async fn missing() -> (StatusCode, Json<ErrorEnvelope>) {
    let error = ErrorObject {
        status: "404".to_string(),
        code: "NOT_FOUND".to_string(),
        title: "Missing".to_string(),
        ..Default::default()
    };
    (StatusCode::NOT_FOUND, Json(ErrorEnvelope::single(error)))
}

async fn guided() -> (StatusCode, Json<ErrorEnvelope>) {
    let error = ErrorObject {
        id: Some("err-guided-1".to_string()),
        status: "409".to_string(),
        code: "SPELL_CONFLICT".to_string(),
        title: "Spell already cast".to_string(),
        detail: Some("A spell with this name is already active".to_string()),
        source: Some(json!({"pointer": "/data/attributes/name"})),
        meta: Some(ErrorMeta {
            platform_specific: Some(PlatformSpecific {
                handling_guide: Some("Show the active spell instead of casting again".to_string()),
                recovery_suggestion: None,
            }),
        }),
        links: Some(json!({"about": "https://docs.jadugar.com/errors/SPELL_CONFLICT"})),
    };
    (StatusCode::CONFLICT, Json(ErrorEnvelope::single(error)))
}

async fn garbage() -> (StatusCode, &'static str) {
    (StatusCode::OK, "this is not json")
}

async fn html_error() -> impl IntoResponse {
    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body>Bad gateway</body></html>",
    )
}

async fn empty_errors() -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"errors": []})))
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Reflect the request back: lowercased header names, method and raw body.
async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "headers": headers,
        "body": body,
    }))
}
