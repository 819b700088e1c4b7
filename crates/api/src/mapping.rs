//! Outcome → HTTP mapping for the add-good workflow.
//!
//! This is the only place that knows which status code each workflow outcome
//! gets. The reconciler itself is transport-agnostic.

use axum::http::StatusCode;

use orderdesk_infra::{AddGoodOutcome, GatewayError};
use orderdesk_sales::AddGood;

use crate::app::dto::AddGoodResponse;

pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";

pub fn outcome_status(outcome: &AddGoodOutcome) -> StatusCode {
    match outcome {
        AddGoodOutcome::OrderNotFound | AddGoodOutcome::GoodNotFound => StatusCode::NOT_FOUND,
        AddGoodOutcome::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
        AddGoodOutcome::StockUpdateFailed | AddGoodOutcome::LineUpdateFailed => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AddGoodOutcome::Merged { .. } | AddGoodOutcome::Created { .. } => StatusCode::CREATED,
    }
}

pub fn outcome_message(outcome: &AddGoodOutcome) -> String {
    match outcome {
        AddGoodOutcome::OrderNotFound => "Order not found".to_string(),
        AddGoodOutcome::GoodNotFound => "Good not found".to_string(),
        AddGoodOutcome::InsufficientStock {
            available,
            requested,
        } => format!("Insufficient stock. Available: {available}, requested: {requested}"),
        AddGoodOutcome::StockUpdateFailed => "Error updating stock quantity".to_string(),
        AddGoodOutcome::LineUpdateFailed => "Error adding good to order".to_string(),
        AddGoodOutcome::Merged {
            line_amount,
            remaining_stock,
        } => format!(
            "Quantity in order increased. New quantity: {line_amount}. Remaining stock: {remaining_stock}"
        ),
        AddGoodOutcome::Created {
            remaining_stock, ..
        } => format!("Good successfully added to order. Remaining stock: {remaining_stock}"),
    }
}

pub fn outcome_response(cmd: &AddGood, outcome: AddGoodOutcome) -> (StatusCode, AddGoodResponse) {
    let status = outcome_status(&outcome);
    let message = outcome_message(&outcome);

    let body = match outcome {
        AddGoodOutcome::Merged {
            line_amount,
            remaining_stock,
        }
        | AddGoodOutcome::Created {
            line_amount,
            remaining_stock,
        } => AddGoodResponse::succeeded(cmd, message, line_amount, remaining_stock),
        failure => AddGoodResponse::failed(cmd, failure.kind(), message),
    };

    (status, body)
}

pub fn internal_error_response(cmd: &AddGood, err: &GatewayError) -> (StatusCode, AddGoodResponse) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        AddGoodResponse::failed(cmd, INTERNAL_ERROR, format!("Internal server error: {err}")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderdesk_core::{GoodId, OrderId};

    fn cmd() -> AddGood {
        AddGood::new(OrderId::new(1).unwrap(), GoodId::new(5).unwrap(), 2).unwrap()
    }

    #[test]
    fn status_classes_follow_outcome_kind() {
        let cases = [
            (AddGoodOutcome::OrderNotFound, StatusCode::NOT_FOUND),
            (AddGoodOutcome::GoodNotFound, StatusCode::NOT_FOUND),
            (
                AddGoodOutcome::InsufficientStock {
                    available: 1,
                    requested: 2,
                },
                StatusCode::BAD_REQUEST,
            ),
            (AddGoodOutcome::StockUpdateFailed, StatusCode::INTERNAL_SERVER_ERROR),
            (AddGoodOutcome::LineUpdateFailed, StatusCode::INTERNAL_SERVER_ERROR),
            (
                AddGoodOutcome::Merged {
                    line_amount: 3,
                    remaining_stock: 7,
                },
                StatusCode::CREATED,
            ),
            (
                AddGoodOutcome::Created {
                    line_amount: 2,
                    remaining_stock: 8,
                },
                StatusCode::CREATED,
            ),
        ];

        for (outcome, expected) in cases {
            assert_eq!(outcome_status(&outcome), expected, "{outcome:?}");
        }
    }

    #[test]
    fn insufficient_stock_message_names_both_amounts() {
        let (status, body) = outcome_response(
            &cmd(),
            AddGoodOutcome::InsufficientStock {
                available: 1,
                requested: 2,
            },
        );

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert_eq!(body.message, "Insufficient stock. Available: 1, requested: 2");
        assert_eq!(body.error_code, Some("INSUFFICIENT_STOCK"));
    }

    #[test]
    fn write_failures_use_fixed_messages_and_codes() {
        let (status, body) = outcome_response(&cmd(), AddGoodOutcome::StockUpdateFailed);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Error updating stock quantity");
        assert_eq!(body.error_code, Some("STOCK_UPDATE_FAILED"));

        let (status, body) = outcome_response(&cmd(), AddGoodOutcome::LineUpdateFailed);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Error adding good to order");
        assert_eq!(body.error_code, Some("LINE_UPDATE_FAILED"));
    }

    #[test]
    fn merged_response_carries_new_quantity_and_stock() {
        let (status, body) = outcome_response(
            &cmd(),
            AddGoodOutcome::Merged {
                line_amount: 3,
                remaining_stock: 7,
            },
        );

        assert_eq!(status, StatusCode::CREATED);
        assert!(body.success);
        assert_eq!(
            body.message,
            "Quantity in order increased. New quantity: 3. Remaining stock: 7"
        );
        assert_eq!(body.line_amount, Some(3));
        assert_eq!(body.remaining_stock, Some(7));
        assert_eq!(body.amount, Some(2));
        assert_eq!(body.error_code, None);
    }

    #[test]
    fn storage_failure_becomes_internal_error_with_cause() {
        let err = GatewayError::unavailable("find_order", "connection refused");
        let (status, body) = internal_error_response(&cmd(), &err);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error_code, Some(INTERNAL_ERROR));
        assert!(body.message.starts_with("Internal server error: "));
        assert!(body.message.contains("connection refused"));
    }
}
