use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use orderdesk_infra::OrderGateway;

use crate::app::dto::{HealthResponse, ServiceInfo};
use crate::app::services::AppServices;

pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Order Management API",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Liveness probe: one trivial storage round-trip.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.gateway().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "connected",
                error: None,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: "disconnected",
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}
