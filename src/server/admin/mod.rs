mod stats;
mod stores;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::server::AppState;

pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        // User routes
        .route("/users", post(users::create_user))
        .route(
            "/users/{id}",
            put(users::update_user).delete(users::delete_user),
        )
        .route("/owners", get(users::list_owners))
        // Store routes
        .route("/stores", get(stores::list_stores).post(stores::create_store))
        .route(
            "/stores/{id}",
            get(stores::get_store)
                .put(stores::update_store)
                .delete(stores::delete_store),
        )
        // Dashboard
        .route("/stats", get(stats::get_stats))
}
