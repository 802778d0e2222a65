//! API routes module

pub mod emails;
pub mod pages;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

pub type SharedState = Arc<RwLock<AppState>>;

/// Create the combined router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Index, login, logout and register pages
        .merge(pages::router())
        // JSON email routes
        .merge(emails::router())
}
