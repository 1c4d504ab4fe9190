mod admin;
mod auth;
pub mod dto;
mod owner;
pub mod response;
mod router;
mod stores;
pub mod validation;

pub use admin::admin_router;
pub use auth::auth_router;
pub use owner::owner_router;
pub use router::{AppState, create_router};
pub use stores::stores_router;
