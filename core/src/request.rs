//! Request building: URL validation and the standard header set.

use std::sync::Arc;

use serde::Serialize;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{codes, NormalizedError};
use crate::http::{
    Headers, HttpMethod, HttpRequest, AUTHORIZATION, CLIENT_PLATFORM, CLIENT_VERSION, CONTENT_TYPE,
    REQUEST_ID,
};
use crate::request_id::{RequestIdSource, ThreadRngIds};

/// Per-call overrides. Headers given here are applied after the standard
/// ones and replace them on a name collision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub body: Option<String>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `body` as the JSON request payload.
    pub fn json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, serde_json::Error> {
        let text = serde_json::to_string(body)?;
        Ok(self.body(text))
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Turns an endpoint plus `RequestOptions` into a ready-to-send
/// `HttpRequest`. Cheap to clone; holds no mutable state.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    config: Arc<ClientConfig>,
    ids: Arc<dyn RequestIdSource>,
}

impl RequestBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_id_source(config, Arc::new(ThreadRngIds))
    }

    pub fn with_id_source(config: ClientConfig, ids: Arc<dyn RequestIdSource>) -> Self {
        Self {
            config: Arc::new(config),
            ids,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the request for `endpoint`, appended verbatim to the base URL.
    ///
    /// Fails with `INVALID_URL` (status 400) when the combined URL does not
    /// parse; nothing is sent in that case.
    pub fn build(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<HttpRequest, NormalizedError> {
        let raw = format!("{}{}", self.config.base_url(), endpoint);
        let url = Url::parse(&raw).map_err(|e| {
            NormalizedError::synthesize(400, codes::INVALID_URL, "Invalid URL", Some(format!("{raw}: {e}")))
        })?;

        let mut headers = Headers::new();
        headers.insert(CONTENT_TYPE, "application/json");
        headers.insert(CLIENT_PLATFORM, self.config.platform().as_str());
        headers.insert(CLIENT_VERSION, self.config.version());
        headers.insert(REQUEST_ID, self.ids.next_id().to_string());
        if let Some(key) = self.config.api_key() {
            headers.insert(AUTHORIZATION, format!("Bearer {key}"));
        }
        for (name, value) in options.headers {
            headers.insert(name, value);
        }

        Ok(HttpRequest {
            method: options.method,
            url: url.into(),
            headers,
            body: options.body,
        })
    }
}
