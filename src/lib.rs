//! # Storerate
//!
//! A store rating REST service with role-based access control, usable both
//! as a standalone binary and as a library.
//!
//! Users browse stores and rate them from 1 to 5, store owners see the
//! ratings left on their stores, and admins manage accounts and stores.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! storerate = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storerate::auth::{TOKEN_TTL, TokenService};
//! use storerate::server::{AppState, create_router};
//! use storerate::store::{Database, SqliteStore};
//!
//! let store = SqliteStore::new("./data/storerate.db")?;
//! store.initialize()?;
//!
//! let tokens = TokenService::new(b"signing-secret", TOKEN_TTL)?;
//! let state = Arc::new(AppState::new(Arc::new(store), tokens));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `storerate` binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
