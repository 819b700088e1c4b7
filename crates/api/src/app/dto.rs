use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainResult, GoodId, OrderId};
use orderdesk_sales::AddGood;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /orders/add-good`.
///
/// Fields are plain integers so that out-of-range values reach
/// [`AddGoodRequest::to_command`] and produce a validation error, not a
/// deserialization failure.
#[derive(Debug, Copy, Clone, Deserialize)]
pub struct AddGoodRequest {
    pub order_id: i64,
    pub good_id: i64,
    pub amount: i64,
}

impl AddGoodRequest {
    pub fn to_command(&self) -> DomainResult<AddGood> {
        AddGood::new(
            OrderId::new(self.order_id)?,
            GoodId::new(self.good_id)?,
            self.amount,
        )
    }
}

// -------------------------
// Response DTOs
// -------------------------

/// Uniform response for the add-good endpoint, success or failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddGoodResponse {
    pub success: bool,
    pub message: String,
    pub order_id: Option<i64>,
    pub good_id: Option<i64>,
    pub amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_amount: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl AddGoodResponse {
    pub fn succeeded(
        cmd: &AddGood,
        message: impl Into<String>,
        line_amount: i64,
        remaining_stock: i64,
    ) -> Self {
        Self {
            success: true,
            message: message.into(),
            order_id: Some(cmd.order_id().get()),
            good_id: Some(cmd.good_id().get()),
            amount: Some(cmd.amount()),
            line_amount: Some(line_amount),
            remaining_stock: Some(remaining_stock),
            error_code: None,
        }
    }

    pub fn failed(cmd: &AddGood, error_code: &'static str, message: impl Into<String>) -> Self {
        Self::rejected(
            Some(AddGoodRequest {
                order_id: cmd.order_id().get(),
                good_id: cmd.good_id().get(),
                amount: cmd.amount(),
            }),
            error_code,
            message,
        )
    }

    /// Failure for a request that never became a command.
    pub fn rejected(
        request: Option<AddGoodRequest>,
        error_code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            order_id: request.map(|r| r.order_id),
            good_id: request.map(|r| r.good_id),
            amount: request.map(|r| r.amount),
            line_amount: None,
            remaining_stock: None,
            error_code: Some(error_code),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
