//! Executes core `HttpRequest`s over the network.

use std::time::Duration;

use tracing::trace;
use treat_core::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("{method} {url} failed: {source}")]
    Request {
        method: &'static str,
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("reading response body from {url} failed: {source}")]
    Body {
        url: String,
        #[source]
        source: ureq::Error,
    },
}

/// Blocking HTTP round-trip. Non-2xx statuses are returned as responses,
/// only connection-level failures are errors.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = request.method.as_str();
        trace!(method, url = %request.url, "notion request");

        let mut builder = match request.method {
            HttpMethod::Post => self.agent.post(&request.url),
            HttpMethod::Patch => self.agent.patch(&request.url),
        };
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        let body = request.body.unwrap_or_default();
        let mut response = builder
            .send(body.as_bytes())
            .map_err(|source| TransportError::Request {
                method,
                url: request.url.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|source| TransportError::Body {
                url: request.url.clone(),
                source,
            })?;
        trace!(status, url = %request.url, "notion response");

        Ok(HttpResponse { status, body })
    }
}
