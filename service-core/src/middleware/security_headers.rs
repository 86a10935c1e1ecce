use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Swagger UI and its OpenAPI document, wherever the API prefix mounts them.
fn is_docs_route(path: &str) -> bool {
    path.ends_with("/docs") || path.contains("/docs/") || path.ends_with("/openapi.json")
}

/// Hardening headers for a JSON API. The docs pages get a CSP that lets
/// Swagger UI load its own scripts and styles.
pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let is_docs = is_docs_route(req.uri().path());

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    if is_docs {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; \
                 script-src 'self' 'unsafe-inline'; \
                 style-src 'self' 'unsafe-inline'; \
                 img-src 'self' data:; \
                 font-src 'self'; \
                 connect-src 'self'",
            ),
        );
        headers.insert(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("SAMEORIGIN"),
        );
    } else {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        );
        headers.insert(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("DENY"),
        );
        headers.insert(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("no-store"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docs_routes_are_recognized_under_any_prefix() {
        assert!(is_docs_route("/docs"));
        assert!(is_docs_route("/api/v1/docs/"));
        assert!(is_docs_route("/api/v1/docs/swagger-ui.css"));
        assert!(is_docs_route("/api/v1/openapi.json"));

        assert!(!is_docs_route("/api/v1/avatar-theme"));
        assert!(!is_docs_route("/api/v1/video-generation/status/docs-123"));
    }
}
