mod listing;
mod ratings;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;

pub fn stores_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public browsing
        .route("/", get(listing::list_stores))
        .route("/{id}", get(listing::get_store))
        .route("/{id}/ratings", get(listing::list_store_ratings))
        // Rating submission (user role)
        .route("/{id}/rating", post(ratings::submit_rating))
        .route("/{id}/rate", post(ratings::rate_store))
}
