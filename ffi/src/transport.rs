//! Blocking `Transport` over `ureq`, used by the completion-callback API.

use std::fmt;

use jadugar_core::{Headers, HttpMethod, HttpRequest, HttpResponse, Transport, TransportFailure};
use ureq::http::Response;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, Body, RequestBuilder};

/// ureq agent with status-as-error disabled, so 4xx/5xx responses come
/// back as data for the core to classify. No timeouts are configured.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let url = request.url.as_str();
        let result = match request.method {
            HttpMethod::Get => without_body(self.agent.get(url), request),
            HttpMethod::Delete => without_body(self.agent.delete(url), request),
            HttpMethod::Head => without_body(self.agent.head(url), request),
            HttpMethod::Options => without_body(self.agent.options(url), request),
            HttpMethod::Post => with_body(self.agent.post(url), request),
            HttpMethod::Put => with_body(self.agent.put(url), request),
            HttpMethod::Patch => with_body(self.agent.patch(url), request),
        };
        let mut response = result.map_err(|e| TransportFailure::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = match response.body_mut().read_to_string() {
            Ok(body) => Some(body),
            Err(err) => {
                tracing::debug!(%err, "failed to read response body");
                None
            }
        };
        Ok(HttpResponse { status, headers, body })
    }
}

fn apply_headers<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in request.headers.iter() {
        builder = builder.header(name, value);
    }
    builder
}

fn without_body(
    builder: RequestBuilder<WithoutBody>,
    request: &HttpRequest,
) -> Result<Response<Body>, ureq::Error> {
    let builder = apply_headers(builder, request);
    match &request.body {
        Some(body) => builder.force_send_body().send(body.as_bytes()),
        None => builder.call(),
    }
}

fn with_body(
    builder: RequestBuilder<WithBody>,
    request: &HttpRequest,
) -> Result<Response<Body>, ureq::Error> {
    let builder = apply_headers(builder, request);
    match &request.body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
