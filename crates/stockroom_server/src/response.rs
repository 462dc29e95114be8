//! Uniform response envelope.
//!
//! Every response, success or failure, carries the same JSON shape and the same
//! headers. Failures are logged here so handlers do not have to remember to.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::error::Error;
use tracing::{debug, error as log_error, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

pub fn apply_standard_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
}

fn finish(status: StatusCode, body: impl IntoResponse) -> Response {
    let mut response = (status, body).into_response();
    apply_standard_headers(response.headers_mut());
    response
}

/// `{ success: true, data }` at `status`.
pub fn success<T: Serialize>(payload: T, status: StatusCode) -> Response {
    finish(
        status,
        Json(Envelope {
            success: true,
            data: Some(payload),
            error: None,
            field: None,
        }),
    )
}

/// 204 with an empty body.
pub fn no_content() -> Response {
    finish(StatusCode::NO_CONTENT, ())
}

/// `{ success: false, error }` at `status`.
pub fn error(message: &str, status: StatusCode) -> Response {
    log_failure(message, status, None);
    failure(message, None, status)
}

/// Like [`error`], but also logs `cause`. The cause never reaches the client.
pub fn error_with_cause(message: &str, status: StatusCode, cause: &dyn Error) -> Response {
    log_failure(message, status, Some(cause));
    failure(message, None, status)
}

/// Always 400.
pub fn validation_error(message: &str, field: Option<&str>) -> Response {
    info!(status = 400, field = field.unwrap_or_default(), "Validation failed: {message}");
    failure(message, field, StatusCode::BAD_REQUEST)
}

/// Raw blob download. The JSON content type is replaced by `content_type`.
pub fn blob(data: Bytes, content_type: &str) -> Response {
    let mut response = finish(StatusCode::OK, data);
    if let Ok(value) = HeaderValue::from_str(content_type) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

fn failure(message: &str, field: Option<&str>, status: StatusCode) -> Response {
    finish(
        status,
        Json(Envelope::<()> {
            success: false,
            data: None,
            error: Some(message.to_string()),
            field: field.map(str::to_string),
        }),
    )
}

fn log_failure(message: &str, status: StatusCode, cause: Option<&dyn Error>) {
    let status_code = status.as_u16();
    let cause = cause.map(|c| c.to_string()).unwrap_or_default();
    if status.is_server_error() {
        log_error!(status = status_code, cause = %cause, "{message}");
    } else if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
        warn!(status = status_code, cause = %cause, "{message}");
    } else if status == StatusCode::NOT_FOUND {
        debug!(status = status_code, "{message}");
    } else {
        info!(status = status_code, cause = %cause, "{message}");
    }
}
