//! Request IDs for log and Sentry correlation.
//!
//! An ID set by an upstream proxy is kept when it looks sane; otherwise a
//! UUID v4 is generated. Either way it lands in the HTTP span, the Sentry
//! scope and the `x-request-id` response header.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound request ID we trust.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id =
        inbound_request_id(request.headers()).map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// The proxy-supplied ID, if it is short printable ASCII without spaces.
fn inbound_request_id(headers: &HeaderMap) -> Option<&str> {
    let id = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let valid = !id.is_empty()
        && id.len() <= MAX_REQUEST_ID_LEN
        && id.bytes().all(|b| b.is_ascii_graphic());
    valid.then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(REQUEST_ID_HEADER, value);
        }
        headers
    }

    #[test]
    fn test_keeps_sane_inbound_id() {
        assert_eq!(inbound_request_id(&headers("req-123_abc")), Some("req-123_abc"));
    }

    #[test]
    fn test_rejects_empty_long_or_spaced_ids() {
        assert_eq!(inbound_request_id(&HeaderMap::new()), None);
        assert_eq!(inbound_request_id(&headers("")), None);
        assert_eq!(inbound_request_id(&headers("has space")), None);
        assert_eq!(inbound_request_id(&headers(&"x".repeat(129))), None);
        assert!(inbound_request_id(&headers(&"x".repeat(128))).is_some());
    }
}
