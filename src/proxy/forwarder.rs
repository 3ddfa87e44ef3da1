//! Upstream request execution and response shaping.
//!
//! # Responsibilities
//! - Issue exactly one upstream attempt per inbound request (no retries)
//! - Branch on content-type: HTML is buffered and rewritten, everything
//!   else streams through unmodified
//! - Map connect/DNS/TLS failures to 502 before anything is sent
//!
//! # Design Decisions
//! - HTML responses always go out as 200 regardless of the upstream status.
//!   This masks upstream 3xx/4xx/5xx conditions whose error page happens to
//!   be HTML; kept intentionally for compatibility with the always-200
//!   contract. Do not change without a design decision.
//! - Non-HTML bodies are never buffered; client write backpressure throttles
//!   upstream reads. Dropping the response future aborts the in-flight
//!   upstream request, so a client disconnect does not leak sockets.

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::{ProxyError, Result};
use crate::observability::metrics;
use crate::proxy::headers::{outbound_headers, sanitize_response_headers};
use crate::rewrite::html;

/// One outbound request, scoped to a single inbound request.
pub struct ProxyRequest {
    pub target: Url,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ProxyRequest {
    /// A plain GET with no caller headers or body.
    pub fn get(target: Url) -> Self {
        Self {
            target,
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Forwards requests to upstream servers through a shared HTTP client.
pub struct Forwarder {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl Forwarder {
    pub fn new(config: UpstreamConfig) -> Self {
        // Redirects pass through with their original status; following them
        // here would hide 3xx conditions from the client.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .expect("failed to build upstream HTTP client");
        Self { client, config }
    }

    /// Execute one upstream attempt and shape the client-facing response.
    pub async fn forward(&self, request: ProxyRequest) -> Result<Response> {
        let headers = outbound_headers(&self.config, &request.headers);

        tracing::debug!(
            url = %request.target,
            method = %request.method,
            "Forwarding upstream"
        );

        let mut outbound = self
            .client
            .request(request.method, request.target)
            .headers(headers);
        if let Some(body) = request.body {
            outbound = outbound.body(body);
        }

        let upstream = match outbound.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_upstream_error();
                return Err(ProxyError::Upstream(e));
            }
        };

        let content_type = upstream
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.contains("text/html") {
            self.respond_html(upstream).await
        } else {
            Ok(Self::respond_passthrough(upstream))
        }
    }

    /// Buffered path: decode the whole document, rewrite links, respond 200.
    async fn respond_html(&self, upstream: reqwest::Response) -> Result<Response> {
        let upstream_status = upstream.status();
        let bytes = upstream.bytes().await.map_err(|e| {
            metrics::record_upstream_error();
            ProxyError::Upstream(e)
        })?;

        let rewritten = html::rewrite(&String::from_utf8_lossy(&bytes));

        tracing::debug!(
            upstream_status = %upstream_status,
            bytes = bytes.len(),
            "Rewrote HTML response"
        );
        metrics::record_request("html", 200);

        let headers = [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            ),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ];
        Ok((StatusCode::OK, headers, rewritten).into_response())
    }

    /// Streaming path: original status, sanitized headers, unbuffered body.
    fn respond_passthrough(upstream: reqwest::Response) -> Response {
        let status = upstream.status();
        let headers = sanitize_response_headers(upstream.headers());

        metrics::record_request("passthrough", status.as_u16());

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
