//! HTTP route handlers for the store.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Playground
//! GET  /playground/hello       - Products with collections, count and lowest price
//! ```

pub mod playground;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::from_fn,
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the playground routes router.
pub fn playground_routes() -> Router<AppState> {
    Router::new().route("/hello", get(playground::hello))
}

/// Create all routes for the store.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/playground", playground_routes())
}

/// Build the full application: health checks, routes and middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Request span with an empty `request_id` field for the request ID middleware to fill.
fn make_request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = tracing::field::Empty,
    )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::StoreConfig;
    use crate::middleware::REQUEST_ID_HEADER;

    /// State whose pool points at a port nothing listens on.
    fn unreachable_state() -> AppState {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy("postgres://emporium@127.0.0.1:1/emporium")
            .unwrap();
        let config = StoreConfig {
            database_url: SecretString::from("postgres://emporium@127.0.0.1:1/emporium"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            display_name: "Motoki".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        AppState::new(config, pool)
    }

    async fn get_status(uri: &str) -> (StatusCode, bool) {
        let response = app(unreachable_state())
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let has_request_id = response.headers().contains_key(REQUEST_ID_HEADER);
        (response.status(), has_request_id)
    }

    #[tokio::test]
    async fn test_health_is_ok_without_database() {
        let (status, has_request_id) = get_status("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(has_request_id);
    }

    #[tokio::test]
    async fn test_readiness_reports_unreachable_database() {
        let (status, _) = get_status("/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_hello_database_failure_is_generic_500() {
        let response = app(unreachable_state())
            .oneshot(
                Request::builder()
                    .uri("/playground/hello")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Internal server error");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (status, _) = get_status("/playground/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
