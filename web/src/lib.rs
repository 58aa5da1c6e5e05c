//! Jadugar client for the "web" platform.
//!
//! # Overview
//! Awaited-call adapter over `reqwest`. Every request is tagged
//! `X-Client-Platform: web`; request building and outcome classification
//! come from `jadugar-core`, this crate only performs the exchange.
//!
//! ```no_run
//! use jadugar_web::{RequestOptions, WebClient};
//!
//! # async fn demo() {
//! let client = WebClient::new("https://api.jadugar.com/v1");
//! match client.request::<serde_json::Value>("/some-endpoint", RequestOptions::new()).await {
//!     Ok(result) => println!("{result}"),
//!     Err(err) => {
//!         eprintln!("{}: {}", err.title(), err.detail().unwrap_or_default());
//!         if let Some(guide) = err.handling_guide() {
//!             eprintln!("Handling guide: {guide}");
//!         }
//!     }
//! }
//! # }
//! ```

use jadugar_core::{
    parse_response, ClientConfig, ConfigError, Headers, HttpRequest, HttpResponse, Platform,
    RequestBuilder, TransportFailure,
};
use serde::de::DeserializeOwned;
use tracing::debug;

pub use jadugar_core::{codes, HttpMethod, NormalizedError, RequestOptions};

/// Construction options; both fall back to the config defaults.
#[derive(Debug, Clone, Default)]
pub struct WebClientOptions {
    pub api_key: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WebClient {
    builder: RequestBuilder,
    http: reqwest::Client,
}

impl WebClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_options(base_url, WebClientOptions::default())
    }

    pub fn with_options(base_url: &str, options: WebClientOptions) -> Self {
        let mut config = ClientConfig::new(base_url, Platform::Web);
        if let Some(key) = options.api_key {
            config = config.with_api_key(key);
        }
        if let Some(version) = options.version {
            config = config.with_version(version);
        }
        Self::from_config(config)
    }

    /// Configure from `JADUGAR_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        ClientConfig::from_env(Platform::Web).map(Self::from_config)
    }

    fn from_config(config: ClientConfig) -> Self {
        Self {
            builder: RequestBuilder::new(config),
            http: reqwest::Client::new(),
        }
    }

    /// Replace the underlying `reqwest::Client`, e.g. to share a pool or
    /// set proxy options.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        self.builder.config()
    }

    pub async fn request<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<R, NormalizedError> {
        let request = self.builder.build(endpoint, options)?;
        let request_id = request.request_id().unwrap_or_default().to_string();
        debug!(%request_id, method = %request.method, url = %request.url, "dispatching request");

        let result = parse_response(self.send(&request).await);
        if let Err(err) = &result {
            debug!(%request_id, code = err.code(), status = err.status(), "request failed");
        }
        result
    }

    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let mut builder = self.http.request(method(request.method), request.url.as_str());
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportFailure::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = match response.text().await {
            Ok(body) => Some(body),
            Err(err) => {
                debug!(%err, "failed to read response body");
                None
            }
        };
        Ok(HttpResponse { status, headers, body })
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}
