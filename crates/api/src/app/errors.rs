use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::app::dto::{AddGoodRequest, AddGoodResponse};
use crate::mapping::VALIDATION_ERROR;

/// 400 in the add-good response shape, for input that never became a command.
pub fn validation_error(
    request: Option<AddGoodRequest>,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(AddGoodResponse::rejected(request, VALIDATION_ERROR, message)),
    )
        .into_response()
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    validation_error(None, rejection.body_text())
}
