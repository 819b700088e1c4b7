use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use orderdesk_core::{GoodId, OrderId};
use orderdesk_inventory::Good;
use orderdesk_sales::{AddGood, Order, OrderedGood};

/// Storage failure that the workflow cannot turn into a business outcome.
///
/// Statement-level failures on writes (constraint violations and the like) are
/// *not* errors: the write methods report them as `Ok(false)`. Only failures
/// that mean storage itself is unreachable or returned garbage end up here.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("storage unavailable during {operation}: {message}")]
    Unavailable {
        operation: &'static str,
        message: String,
    },

    #[error("failed to decode {entity} row: {message}")]
    Decode {
        entity: &'static str,
        message: String,
    },
}

impl GatewayError {
    pub fn unavailable(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            operation,
            message: message.into(),
        }
    }

    pub fn decode(entity: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            entity,
            message: message.into(),
        }
    }
}

/// Result of the single-unit-of-work add-good write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Stock decremented and line written together.
    Committed {
        line_amount: i64,
        remaining_stock: i64,
        merged: bool,
    },
    /// Stock was lower than requested at write time; nothing changed.
    InsufficientStock { available: i64 },
    /// The good row disappeared before the decrement; nothing changed.
    GoodVanished,
    /// The line write failed; the stock decrement was rolled back.
    LineWriteFailed,
}

/// Point lookups and point writes for orders, goods and order lines.
///
/// Every method may fail with [`GatewayError`]; callers propagate it.
///
/// The first six methods are independent round-trips with no transaction
/// spanning them. `commit_add_good` is the one place where a stock decrement
/// and a line write happen atomically.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>, GatewayError>;

    async fn find_good(&self, good_id: GoodId) -> Result<Option<Good>, GatewayError>;

    /// All lines of an order, in no particular order.
    async fn list_order_lines(&self, order_id: OrderId) -> Result<Vec<OrderedGood>, GatewayError>;

    /// Insert the line, or overwrite the amount of the existing line for the
    /// same `(order_id, good_id)`. Not an increment.
    ///
    /// `Ok(false)` means the statement failed in a non-fatal way.
    async fn upsert_order_line(&self, line: &OrderedGood) -> Result<bool, GatewayError>;

    /// Unconditionally overwrite a good's stock.
    ///
    /// `Ok(false)` when no row was affected or the statement failed.
    async fn set_good_amount(&self, good_id: GoodId, amount: i64) -> Result<bool, GatewayError>;

    /// `Ok(true)` only if exactly one line was removed.
    async fn delete_order_line(
        &self,
        order_id: OrderId,
        good_id: GoodId,
    ) -> Result<bool, GatewayError>;

    /// Conditionally decrement stock and add the quantity to the order line
    /// (insert or increment) as one unit of work.
    async fn commit_add_good(&self, cmd: &AddGood) -> Result<CommitOutcome, GatewayError>;

    /// Trivial storage round-trip for liveness checks.
    async fn ping(&self) -> Result<(), GatewayError>;
}

#[async_trait]
impl<G> OrderGateway for Arc<G>
where
    G: OrderGateway + ?Sized,
{
    async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>, GatewayError> {
        (**self).find_order(order_id).await
    }

    async fn find_good(&self, good_id: GoodId) -> Result<Option<Good>, GatewayError> {
        (**self).find_good(good_id).await
    }

    async fn list_order_lines(&self, order_id: OrderId) -> Result<Vec<OrderedGood>, GatewayError> {
        (**self).list_order_lines(order_id).await
    }

    async fn upsert_order_line(&self, line: &OrderedGood) -> Result<bool, GatewayError> {
        (**self).upsert_order_line(line).await
    }

    async fn set_good_amount(&self, good_id: GoodId, amount: i64) -> Result<bool, GatewayError> {
        (**self).set_good_amount(good_id, amount).await
    }

    async fn delete_order_line(
        &self,
        order_id: OrderId,
        good_id: GoodId,
    ) -> Result<bool, GatewayError> {
        (**self).delete_order_line(order_id, good_id).await
    }

    async fn commit_add_good(&self, cmd: &AddGood) -> Result<CommitOutcome, GatewayError> {
        (**self).commit_add_good(cmd).await
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        (**self).ping().await
    }
}
