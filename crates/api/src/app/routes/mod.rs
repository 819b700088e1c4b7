use axum::Router;

pub mod orders;
pub mod system;

/// Router for the business endpoints.
pub fn router() -> Router {
    Router::new().nest("/orders", orders::router())
}
