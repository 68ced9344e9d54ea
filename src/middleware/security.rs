// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Security headers middleware.

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Pages carry their own inline styles and scripts; card images may be
/// hosted elsewhere.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     img-src 'self' https: data:; \
     style-src 'self' 'unsafe-inline'; \
     script-src 'self' 'unsafe-inline'; \
     media-src 'self'; \
     frame-ancestors 'none'; \
     form-action 'self'";

/// Headers set on every response, replacing any handler value.
const FIXED_HEADERS: [(HeaderName, &str); 5] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (
        header::STRICT_TRANSPORT_SECURITY,
        "max-age=31536000; includeSubDomains",
    ),
    (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
    (header::REFERRER_POLICY, "same-origin"),
];

/// Add security headers to all responses.
///
/// Responses default to `Cache-Control: no-store` since pages echo card
/// state and accept keys; handlers that set their own policy keep it.
pub async fn add_security_headers(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in FIXED_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    headers
        .entry(header::CACHE_CONTROL)
        .or_insert(HeaderValue::from_static("no-store"));

    response
}
