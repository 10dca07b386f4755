//! Metrics middleware for API routes.

use axum::{
    body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response,
};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION};

/// Path label for requests that hit no route.
const UNMATCHED_PATH: &str = "unmatched";

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
///
/// Requests are labelled by their route template, so arbitrary client paths
/// cannot grow the label set.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    async fn dummy_handler() -> &'static str {
        "OK"
    }

    #[tokio::test]
    async fn test_requests_are_counted() {
        let app = Router::new()
            .route("/counted", get(dummy_handler))
            .layer(middleware::from_fn(metrics_middleware));

        let before = HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/counted", "200"])
            .get();

        let request = Request::builder()
            .uri("/counted")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            HTTP_REQUESTS_TOTAL
                .with_label_values(&["GET", "/counted", "200"])
                .get(),
            before + 1
        );
    }

    #[tokio::test]
    async fn test_requests_are_labelled_by_route_template() {
        let app = Router::new()
            .nest("/api/v1", Router::new().route("/items/{id}", get(dummy_handler)))
            .layer(middleware::from_fn(metrics_middleware));

        let templated = || {
            HTTP_REQUESTS_TOTAL
                .with_label_values(&["GET", "/api/v1/items/{id}", "200"])
                .get()
        };
        let unmatched = || {
            HTTP_REQUESTS_TOTAL
                .with_label_values(&["GET", UNMATCHED_PATH, "404"])
                .get()
        };
        let before_templated = templated();
        let before_unmatched = unmatched();

        for uri in ["/api/v1/items/12345", "/api/v1/items/abc"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let request = Request::builder()
            .uri("/api/v1/monitor/strikes/a94a8fe5ccb19ba61c4c0873d391e987982fbbd3")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert!(templated() >= before_templated + 2);
        assert!(unmatched() >= before_unmatched + 1);
        assert_eq!(
            HTTP_REQUESTS_TOTAL
                .with_label_values(&["GET", "/api/v1/items/12345", "200"])
                .get(),
            0
        );
    }
}
