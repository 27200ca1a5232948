//! Response assembly.
//!
//! # Responsibilities
//! - Uniform error responses (400/403/404/405/500)
//! - Caching headers shared by 200 and 304
//! - Client-hint advertisement headers
//!
//! # Design Decisions
//! - Errors are a typed enum rendered through `IntoResponse`, so an error
//!   response never carries headers prepared for a success
//! - Error bodies are the canonical reason phrase in plain text

use std::path::PathBuf;
use std::time::SystemTime;

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, EXPIRES, LAST_MODIFIED};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::config::schema::DeliveryConfig;
use crate::imaging::transform::TransformError;
use crate::negotiation::InvalidParameters;

pub const ERROR_CACHE_CONTROL: &str = "private, no-cache, no-store";
pub const ERROR_EXPIRES: &str = "Sat, 25 Aug 1991 03:00:00 GMT";
pub const ERROR_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub const ACCEPT_CH: HeaderName = HeaderName::from_static("accept-ch");
pub const ACCEPT_CH_LIFETIME: HeaderName = HeaderName::from_static("accept-ch-lifetime");
pub const CONTENT_DPR: HeaderName = HeaderName::from_static("content-dpr");

pub const ACCEPT_CH_VALUE: &str = "Width, Viewport-Width, DPR, RTT, ECT, Downlink";
pub const VARY_VALUE: &str = "Width, DPR, Save-Data, RTT, ECT, Downlink, Viewport-Width";

/// Terminal request failures.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid parameters: {0}")]
    BadRequest(#[from] InvalidParameters),

    #[error("permission denied: {}", .0.display())]
    Forbidden(PathBuf),

    #[error("not found")]
    NotFound,

    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),

    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("transform task failed: {0}")]
    Task(String),

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

impl DeliveryError {
    pub fn status(&self) -> StatusCode {
        match self {
            DeliveryError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DeliveryError::Forbidden(_) => StatusCode::FORBIDDEN,
            DeliveryError::NotFound => StatusCode::NOT_FOUND,
            DeliveryError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            DeliveryError::Transform(_) | DeliveryError::Task(_) | DeliveryError::DeadlineExceeded => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for DeliveryError {
    fn into_response(self) -> Response {
        error_response(self.status())
    }
}

/// The uniform error response for `status`.
pub fn error_response(status: StatusCode) -> Response {
    let reason = status.canonical_reason().unwrap_or("Error");
    let mut response = Response::new(Body::from(reason));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(ERROR_CACHE_CONTROL));
    headers.insert(EXPIRES, HeaderValue::from_static(ERROR_EXPIRES));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(ERROR_CONTENT_TYPE));
    response
}

/// Insert a header from formatted text, skipping values that are not valid header text.
pub fn insert_text(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, value = %value, "Skipping invalid header value"),
    }
}

/// `Cache-Control` and `Last-Modified`, identical on 200 and 304.
pub fn insert_cache_headers(headers: &mut HeaderMap, delivery: &DeliveryConfig, last_modified: SystemTime) {
    insert_text(
        headers,
        CACHE_CONTROL,
        &format!("public, max-age={0}, s-max-age={0}", delivery.max_age),
    );
    insert_text(headers, LAST_MODIFIED, &httpdate::fmt_http_date(last_modified));
}

/// Headers advertising and varying on client hints.
pub fn insert_negotiation_headers(headers: &mut HeaderMap, delivery: &DeliveryConfig) {
    headers.insert(ACCEPT_CH, HeaderValue::from_static(ACCEPT_CH_VALUE));
    headers.insert(ACCEPT_CH_LIFETIME, HeaderValue::from(delivery.ach_lifetime));
    headers.insert(axum::http::header::VARY, HeaderValue::from_static(VARY_VALUE));
}

/// 304 response for a conditional GET.
pub fn not_modified(delivery: &DeliveryConfig, last_modified: SystemTime) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NOT_MODIFIED;
    insert_cache_headers(response.headers_mut(), delivery, last_modified);
    response
}

/// `Content-DPR` value: two decimals, shortest form (`1`, `0.5`, `0.33`).
pub fn format_content_dpr(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[tokio::test]
    async fn test_error_shape() {
        let cases = [
            (StatusCode::BAD_REQUEST, "Bad Request"),
            (StatusCode::FORBIDDEN, "Forbidden"),
            (StatusCode::NOT_FOUND, "Not Found"),
            (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        ];
        for (status, body) in cases {
            let response = error_response(status);
            assert_eq!(response.status(), status);
            assert_eq!(response.headers()[CACHE_CONTROL], ERROR_CACHE_CONTROL);
            assert_eq!(response.headers()[EXPIRES], ERROR_EXPIRES);
            assert_eq!(response.headers()[CONTENT_TYPE], ERROR_CONTENT_TYPE);
            let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
            assert_eq!(&bytes[..], body.as_bytes());
        }
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(DeliveryError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            DeliveryError::Forbidden(PathBuf::from("/srv/a.jpg")).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            DeliveryError::MethodNotAllowed(Method::POST).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            DeliveryError::from(InvalidParameters::QualityOutOfRange(0)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(DeliveryError::DeadlineExceeded.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            DeliveryError::Transform(TransformError::Encode("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_modified_headers() {
        let delivery = DeliveryConfig {
            max_age: 60,
            ..DeliveryConfig::default()
        };
        let mtime = UNIX_EPOCH + Duration::from_secs(784_111_777);
        let response = not_modified(&delivery, mtime);
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.headers()[CACHE_CONTROL], "public, max-age=60, s-max-age=60");
        assert_eq!(response.headers()[LAST_MODIFIED], "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_negotiation_headers() {
        let mut headers = HeaderMap::new();
        insert_negotiation_headers(&mut headers, &DeliveryConfig::default());
        assert_eq!(headers[ACCEPT_CH], ACCEPT_CH_VALUE);
        assert_eq!(headers[ACCEPT_CH_LIFETIME], "864000");
        assert_eq!(headers[axum::http::header::VARY], VARY_VALUE);
    }

    #[test]
    fn test_content_dpr_format() {
        assert_eq!(format_content_dpr(1.0), "1");
        assert_eq!(format_content_dpr(0.5), "0.5");
        assert_eq!(format_content_dpr(1.0 / 3.0), "0.33");
        assert_eq!(format_content_dpr(2.0 / 3.0 * 2.0), "1.33");
    }
}
