//! Route handlers.
//!
//! Each handler validates its own input and reports client errors at the
//! earliest point of detection; nothing invalid is forwarded upstream.

use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use url::Url;

use crate::error::{ProxyError, Result};
use crate::http::server::AppState;
use crate::proxy::forwarder::ProxyRequest;
use crate::proxy::target;

static INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET `/` and `/index.html` — static landing page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET `/healthz`
pub async fn healthz() -> &'static str {
    "ok"
}

/// Fallback for unknown paths.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// GET `/search?q=` — forward to the configured search endpoint.
pub async fn search(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let params = target::query_params(query.as_deref().unwrap_or(""));
    let term = params
        .into_iter()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value)
        .ok_or(ProxyError::MissingParam("q"))?;

    let merged = target::merge_query(
        &state.config.upstream.search_url,
        &[("q".to_string(), term)],
    );
    let url = Url::parse(&merged).map_err(|_| ProxyError::InvalidTarget)?;

    state.forwarder.forward(ProxyRequest::get(url)).await
}

/// GET `/proxy?url=` — fetch and (for HTML) rewrite an arbitrary page.
pub async fn proxy_page(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let url = extract_target(query.as_deref())?;
    state.forwarder.forward(ProxyRequest::get(url)).await
}

/// GET `/formproxy?url=` — re-encode the remaining query parameters onto the
/// target and forward.
pub async fn form_proxy_get(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Response> {
    let params = target::query_params(query.as_deref().unwrap_or(""));
    let raw_target = params
        .iter()
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.clone())
        .ok_or(ProxyError::MissingParam("url"))?;
    if !target::is_absolute_http_url(&raw_target) {
        return Err(ProxyError::InvalidTarget);
    }

    let extra: Vec<(String, String)> = params
        .into_iter()
        .filter(|(key, _)| key != "url")
        .collect();
    let merged = target::merge_query(&raw_target, &extra);
    let url = Url::parse(&merged).map_err(|_| ProxyError::InvalidTarget)?;

    state.forwarder.forward(ProxyRequest::get(url)).await
}

/// POST `/formproxy?url=` — forward the raw body and declared content-type.
pub async fn form_proxy_post(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Body,
) -> Result<Response> {
    let url = extract_target(query.as_deref())?;

    let bytes = axum::body::to_bytes(body, state.config.limits.max_body_size)
        .await
        .map_err(ProxyError::BodyRead)?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/x-www-form-urlencoded"));
    let mut outbound = HeaderMap::new();
    outbound.insert(header::CONTENT_TYPE, content_type);

    state
        .forwarder
        .forward(ProxyRequest {
            target: url,
            method: Method::POST,
            headers: outbound,
            body: Some(bytes),
        })
        .await
}

/// Pull a validated absolute http(s) target out of the `url` query parameter.
fn extract_target(query: Option<&str>) -> Result<Url> {
    let params = target::query_params(query.unwrap_or(""));
    let raw = params
        .into_iter()
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value)
        .ok_or(ProxyError::MissingParam("url"))?;
    if !target::is_absolute_http_url(&raw) {
        return Err(ProxyError::InvalidTarget);
    }
    Url::parse(&raw).map_err(|_| ProxyError::InvalidTarget)
}
