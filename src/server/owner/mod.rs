mod ratings;

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::server::AppState;

pub fn owner_router() -> Router<Arc<AppState>> {
    Router::new().route("/ratings", get(ratings::list_my_store_ratings))
}
