//! Gateway-synthesized responses.
//!
//! # Responsibilities
//! - Terminal responses produced by the route table
//! - Per-service "unavailable" bodies when an upstream cannot serve
//! - Internal error response for routing invariant violations

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Message used when the service name does not follow the `<name>-service` convention.
const GENERIC_UNAVAILABLE: &str =
    "The requested service is currently unavailable. Please try again later.";

/// Response for `Outcome::Terminate`.
pub fn terminal(status: u16, body: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let content_type = if serde_json::from_str::<serde_json::Value>(&body).is_ok() {
        "application/json"
    } else {
        "text/plain; charset=utf-8"
    };
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(content_type))],
        body,
    )
        .into_response()
}

/// Response when `service` cannot be reached (503) or timed out (504).
pub fn service_unavailable(service: &str, status: StatusCode) -> Response {
    let body = json!({
        "status": "error",
        "message": unavailable_message(service),
    });
    (status, axum::Json(body)).into_response()
}

/// Response when the route table has no answer for a path.
pub fn internal_error(message: &str) -> Response {
    let body = json!({
        "status": "error",
        "message": message,
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
}

/// `identity-service` → "Identity service is currently unavailable. ..."
pub fn unavailable_message(service: &str) -> String {
    let Some(name) = service.strip_suffix("-service").filter(|n| !n.is_empty()) else {
        return GENERIC_UNAVAILABLE.to_string();
    };

    let words: Vec<String> = name
        .split('-')
        .filter(|w| !w.is_empty())
        .enumerate()
        .map(|(i, word)| {
            if i > 0 {
                return word.to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        return GENERIC_UNAVAILABLE.to_string();
    }
    format!(
        "{} service is currently unavailable. Please try again later.",
        words.join(" ")
    )
}
