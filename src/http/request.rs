//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Build the upstream request from the inbound one
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Host header is replaced by the instance address; the original goes to `x-forwarded-host`

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::header::{HeaderMap, HeaderName, HeaderValue, HOST};
use axum::http::uri::Scheme;
use axum::http::{Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::headers::strip_hop_by_hop;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Generates `x-request-id` values for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID header value, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Turn an inbound request into one addressed at `instance`, with the rewritten `path`.
///
/// The query string of the inbound request is carried over unchanged.
pub fn upstream_request(
    request: Request<Body>,
    instance: SocketAddr,
    path: &str,
    client: SocketAddr,
) -> Result<Request<Body>, axum::http::Error> {
    let (parts, body) = request.into_parts();

    let path_and_query = match parts.uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    let uri = Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(instance.to_string())
        .path_and_query(path_and_query)
        .build()?;

    let mut headers = parts.headers;
    let original_host = headers.remove(HOST);
    strip_hop_by_hop(&mut headers);
    add_forwarded_headers(&mut headers, client, original_host);

    let mut upstream = Request::new(body);
    *upstream.method_mut() = parts.method;
    *upstream.uri_mut() = uri;
    *upstream.headers_mut() = headers;
    Ok(upstream)
}

fn add_forwarded_headers(headers: &mut HeaderMap, client: SocketAddr, host: Option<HeaderValue>) {
    let client_ip = client.ip().to_string();
    let forwarded_for = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(existing) => format!("{existing}, {client_ip}"),
        None => client_ip,
    };
    if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
        headers.insert(X_FORWARDED_FOR, value);
    }
    if let Some(host) = host {
        headers.insert(X_FORWARDED_HOST, host);
    }
    headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
}
