//! HTTP application wiring (Axum router + storage wiring).
//!
//! - `services.rs`: gateway selection, pool ownership, demo seeding
//! - `routes/`: HTTP handlers
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: responses for requests rejected before the workflow runs

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (used by `main.rs` and the black-box tests).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    Router::new()
        .route("/", get(routes::system::root))
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_id))
                .layer(Extension(services)),
        )
}
