//! Security headers for JSON and static image responses.

use axum::{
    extract::Request,
    http::{
        HeaderMap, HeaderName, HeaderValue,
        header::{CACHE_CONTROL, CONTENT_SECURITY_POLICY, CONTENT_TYPE},
    },
    middleware::Next,
    response::Response,
};

/// Applied to every response.
///
/// CORP is `cross-origin` because the storefront and admin console embed
/// uploaded images from another origin.
const COMMON_HEADERS: [(&str, &str); 5] = [
    ("x-frame-options", "DENY"),
    ("x-content-type-options", "nosniff"),
    ("referrer-policy", "no-referrer"),
    ("cross-origin-resource-policy", "cross-origin"),
    ("x-dns-prefetch-control", "off"),
];

/// SVG uploads can carry script; when opened directly they get no script,
/// no plugins and a sandboxed origin.
const SVG_CSP: &str = "default-src 'none'; style-src 'unsafe-inline'; sandbox";

/// Add security headers to all responses.
///
/// JSON bodies are also marked `no-store` unless the handler chose its own
/// caching.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    apply(response.headers_mut());
    response
}

fn apply(headers: &mut HeaderMap) {
    for (name, value) in COMMON_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().trim().to_ascii_lowercase());

    match content_type.as_deref() {
        Some("application/json") if !headers.contains_key(CACHE_CONTROL) => {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        }
        Some("image/svg+xml") => {
            headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static(SVG_CSP));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_for(content_type: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        apply(&mut headers);
        headers
    }

    #[test]
    fn test_common_headers_always_set() {
        let headers = headers_for(None);
        assert_eq!(headers["x-frame-options"], "DENY");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["cross-origin-resource-policy"], "cross-origin");
        assert!(!headers.contains_key(CACHE_CONTROL));
    }

    #[test]
    fn test_json_is_not_stored() {
        let headers = headers_for(Some("application/json"));
        assert_eq!(headers[CACHE_CONTROL], "no-store");
    }

    #[test]
    fn test_existing_cache_control_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=60"));
        apply(&mut headers);
        assert_eq!(headers[CACHE_CONTROL], "max-age=60");
    }

    #[test]
    fn test_svg_is_sandboxed() {
        let headers = headers_for(Some("image/svg+xml; charset=utf-8"));
        assert_eq!(headers[CONTENT_SECURITY_POLICY], SVG_CSP);
        assert!(!headers.contains_key(CACHE_CONTROL));
    }
}
