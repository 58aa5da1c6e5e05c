//! Blocking Jadugar client over a pluggable `Transport`.
//!
//! # Design
//! `Client` holds an immutable `RequestBuilder` and a transport and carries
//! no other state, so one instance can serve concurrent callers. Each call
//! is build → send → classify; the transport is the only place that
//! blocks. Adapters with a different calling style (async, completion
//! callbacks) reuse `RequestBuilder` and `parse_response` directly.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::NormalizedError;
use crate::http::{HttpRequest, Transport};
use crate::request::{RequestBuilder, RequestOptions};
use crate::request_id::RequestIdSource;
use crate::response::parse_response;

#[derive(Debug, Clone)]
pub struct Client<T> {
    builder: RequestBuilder,
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            builder: RequestBuilder::new(config),
            transport,
        }
    }

    pub fn with_id_source(
        config: ClientConfig,
        ids: Arc<dyn RequestIdSource>,
        transport: T,
    ) -> Self {
        Self {
            builder: RequestBuilder::with_id_source(config, ids),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.builder.config()
    }

    pub fn build_request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<HttpRequest, NormalizedError> {
        self.builder.build(endpoint, options)
    }

    /// Send one request and decode a 2xx body as `R`.
    pub fn request<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<R, NormalizedError> {
        let request = self.builder.build(endpoint, options).inspect_err(|err| {
            debug!(endpoint, code = err.code(), "request rejected before dispatch");
        })?;
        let request_id = request.request_id().unwrap_or_default().to_string();
        debug!(%request_id, method = %request.method, url = %request.url, "dispatching request");

        let result = parse_response(self.transport.send(&request));
        if let Err(err) = &result {
            debug!(%request_id, code = err.code(), status = err.status(), "request failed");
        }
        result
    }
}
