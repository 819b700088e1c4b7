use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::mapping;

pub fn router() -> Router {
    Router::new().route("/add-good", post(add_good))
}

pub async fn add_good(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::AddGoodRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let cmd = match request.to_command() {
        Ok(cmd) => cmd,
        Err(e) => return errors::validation_error(Some(request), e.to_string()),
    };

    let (status, body) = match services.reconciler.add_good_to_order(cmd).await {
        Ok(outcome) => mapping::outcome_response(&cmd, outcome),
        Err(e) => mapping::internal_error_response(&cmd, &e),
    };

    (status, Json(body)).into_response()
}
