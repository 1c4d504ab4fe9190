use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::admin::admin_router;
use super::auth::auth_router;
use super::owner::owner_router;
use super::stores::stores_router;
use crate::auth::{PasswordService, TokenService};
use crate::store::Database;

pub struct AppState {
    pub store: Arc<dyn Database>,
    pub tokens: TokenService,
    pub passwords: PasswordService,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn Database>, tokens: TokenService) -> Self {
        Self {
            store,
            tokens,
            passwords: PasswordService::default(),
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_router())
        .nest("/api/stores", stores_router())
        .nest("/api/admin", admin_router())
        .nest("/api/owner", owner_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TOKEN_TTL;
    use crate::store::SqliteStore;
    use axum::body::Body;
    use axum::http::{self, StatusCode, header};
    use tower::ServiceExt;

    fn app() -> Router {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        let tokens = TokenService::new(b"router-test", TOKEN_TTL).unwrap();
        create_router(Arc::new(AppState::new(Arc::new(store), tokens)))
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(http::Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_without_token() {
        let response = app()
            .oneshot(http::Request::get("/api/admin/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn test_public_store_listing() {
        let response = app()
            .oneshot(http::Request::get("/api/stores").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = app()
            .oneshot(http::Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
