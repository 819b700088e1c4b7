use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use orderdesk_core::{Entity, GoodId, OrderId};
use orderdesk_inventory::Good;
use orderdesk_sales::{AddGood, Order, OrderedGood};

use super::r#trait::{CommitOutcome, GatewayError, OrderGateway};

#[derive(Debug, Default)]
struct Tables {
    orders: HashMap<OrderId, Order>,
    goods: HashMap<GoodId, Good>,
    lines: HashMap<(OrderId, GoodId), OrderedGood>,
}

/// In-memory order gateway.
///
/// Intended for tests/dev. All three tables sit behind one lock, so
/// `commit_add_good` is atomic with respect to every other call. Line writes
/// behave as if foreign keys existed: a line for an unknown order or good is
/// rejected with `Ok(false)`.
#[derive(Debug, Default)]
pub struct InMemoryOrderGateway {
    tables: RwLock<Tables>,
}

impl InMemoryOrderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order: Order) -> Self {
        if let Ok(tables) = self.tables.get_mut() {
            tables.orders.insert(order.key(), order);
        }
        self
    }

    pub fn with_good(mut self, good: Good) -> Self {
        if let Ok(tables) = self.tables.get_mut() {
            tables.goods.insert(good.key(), good);
        }
        self
    }

    pub fn with_line(mut self, line: OrderedGood) -> Self {
        if let Ok(tables) = self.tables.get_mut() {
            tables.lines.insert(line.key(), line);
        }
        self
    }

    /// Current state of a good, for assertions and diagnostics.
    pub fn snapshot_good(&self, good_id: GoodId) -> Option<Good> {
        self.tables.read().ok()?.goods.get(&good_id).cloned()
    }

    /// Current state of an order line, for assertions and diagnostics.
    pub fn snapshot_line(&self, order_id: OrderId, good_id: GoodId) -> Option<OrderedGood> {
        self.tables
            .read()
            .ok()?
            .lines
            .get(&(order_id, good_id))
            .cloned()
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Tables>, GatewayError> {
        self.tables
            .read()
            .map_err(|_| GatewayError::unavailable(operation, "lock poisoned"))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, Tables>, GatewayError> {
        self.tables
            .write()
            .map_err(|_| GatewayError::unavailable(operation, "lock poisoned"))
    }
}

impl Tables {
    fn line_references_exist(&self, order_id: OrderId, good_id: GoodId) -> bool {
        self.orders.contains_key(&order_id) && self.goods.contains_key(&good_id)
    }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
    async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>, GatewayError> {
        Ok(self.read("find_order")?.orders.get(&order_id).cloned())
    }

    async fn find_good(&self, good_id: GoodId) -> Result<Option<Good>, GatewayError> {
        Ok(self.read("find_good")?.goods.get(&good_id).cloned())
    }

    async fn list_order_lines(&self, order_id: OrderId) -> Result<Vec<OrderedGood>, GatewayError> {
        let tables = self.read("list_order_lines")?;
        Ok(tables
            .lines
            .values()
            .filter(|l| l.order_id() == order_id)
            .cloned()
            .collect())
    }

    async fn upsert_order_line(&self, line: &OrderedGood) -> Result<bool, GatewayError> {
        let mut tables = self.write("upsert_order_line")?;
        if !tables.line_references_exist(line.order_id(), line.good_id()) {
            return Ok(false);
        }
        tables.lines.insert(line.key(), line.clone());
        Ok(true)
    }

    async fn set_good_amount(&self, good_id: GoodId, amount: i64) -> Result<bool, GatewayError> {
        let mut tables = self.write("set_good_amount")?;
        let Some(good) = tables.goods.get_mut(&good_id) else {
            return Ok(false);
        };
        match good.with_amount(amount) {
            Ok(updated) => {
                *good = updated;
                Ok(true)
            }
            // Mirrors a CHECK (amount >= 0) rejection.
            Err(_) => Ok(false),
        }
    }

    async fn delete_order_line(
        &self,
        order_id: OrderId,
        good_id: GoodId,
    ) -> Result<bool, GatewayError> {
        let mut tables = self.write("delete_order_line")?;
        Ok(tables.lines.remove(&(order_id, good_id)).is_some())
    }

    async fn commit_add_good(&self, cmd: &AddGood) -> Result<CommitOutcome, GatewayError> {
        let mut tables = self.write("commit_add_good")?;

        let Some(good) = tables.goods.get(&cmd.good_id()) else {
            return Ok(CommitOutcome::GoodVanished);
        };
        let remaining_stock = match good.reserve(cmd.amount()) {
            Ok(remaining) => remaining,
            Err(short) => {
                return Ok(CommitOutcome::InsufficientStock {
                    available: short.available,
                });
            }
        };

        if !tables.orders.contains_key(&cmd.order_id()) {
            return Ok(CommitOutcome::LineWriteFailed);
        }

        let key = (cmd.order_id(), cmd.good_id());
        let previous = tables.lines.get(&key).map(OrderedGood::amount);
        let line_amount = match previous {
            Some(prev) => match prev.checked_add(cmd.amount()) {
                Some(sum) => sum,
                None => return Ok(CommitOutcome::LineWriteFailed),
            },
            None => cmd.amount(),
        };
        let Ok(line) = OrderedGood::new(cmd.order_id(), cmd.good_id(), line_amount) else {
            return Ok(CommitOutcome::LineWriteFailed);
        };
        let Ok(updated_good) = good.with_amount(remaining_stock) else {
            return Ok(CommitOutcome::LineWriteFailed);
        };

        // Both writes are applied under the same guard, so no reader can
        // observe one without the other.
        tables.goods.insert(cmd.good_id(), updated_good);
        tables.lines.insert(key, line);

        Ok(CommitOutcome::Committed {
            line_amount,
            remaining_stock,
            merged: previous.is_some(),
        })
    }

    async fn ping(&self) -> Result<(), GatewayError> {
        self.read("ping").map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderdesk_core::ClientId;
    use rust_decimal::Decimal;

    fn order_id(v: i64) -> OrderId {
        OrderId::new(v).unwrap()
    }

    fn good_id(v: i64) -> GoodId {
        GoodId::new(v).unwrap()
    }

    fn seeded() -> InMemoryOrderGateway {
        InMemoryOrderGateway::new()
            .with_order(Order::new(order_id(1), ClientId::new(1).unwrap()))
            .with_good(Good::new(good_id(5), "Kettle", 10, Decimal::new(1999, 2), None).unwrap())
    }

    #[tokio::test]
    async fn upsert_overwrites_instead_of_incrementing() {
        let gw = seeded();
        let line = OrderedGood::new(order_id(1), good_id(5), 2).unwrap();
        assert!(gw.upsert_order_line(&line).await.unwrap());

        let line = OrderedGood::new(order_id(1), good_id(5), 7).unwrap();
        assert!(gw.upsert_order_line(&line).await.unwrap());

        let lines = gw.list_order_lines(order_id(1)).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].amount(), 7);
    }

    #[tokio::test]
    async fn upsert_for_unknown_order_reports_failure() {
        let gw = seeded();
        let line = OrderedGood::new(order_id(99), good_id(5), 1).unwrap();
        assert!(!gw.upsert_order_line(&line).await.unwrap());
        assert!(gw.snapshot_line(order_id(99), good_id(5)).is_none());
    }

    #[tokio::test]
    async fn set_good_amount_reports_missing_rows_and_negative_values() {
        let gw = seeded();
        assert!(gw.set_good_amount(good_id(5), 3).await.unwrap());
        assert_eq!(gw.snapshot_good(good_id(5)).unwrap().amount(), 3);

        assert!(!gw.set_good_amount(good_id(6), 3).await.unwrap());
        assert!(!gw.set_good_amount(good_id(5), -1).await.unwrap());
        assert_eq!(gw.snapshot_good(good_id(5)).unwrap().amount(), 3);
    }

    #[tokio::test]
    async fn delete_succeeds_only_when_a_line_was_removed() {
        let gw = seeded().with_line(OrderedGood::new(order_id(1), good_id(5), 2).unwrap());

        assert!(gw.delete_order_line(order_id(1), good_id(5)).await.unwrap());
        assert!(!gw.delete_order_line(order_id(1), good_id(5)).await.unwrap());
        assert!(gw.list_order_lines(order_id(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn commit_inserts_then_increments() {
        let gw = seeded();
        let cmd = AddGood::new(order_id(1), good_id(5), 2).unwrap();
        assert_eq!(
            gw.commit_add_good(&cmd).await.unwrap(),
            CommitOutcome::Committed {
                line_amount: 2,
                remaining_stock: 8,
                merged: false
            }
        );

        let cmd = AddGood::new(order_id(1), good_id(5), 1).unwrap();
        assert_eq!(
            gw.commit_add_good(&cmd).await.unwrap(),
            CommitOutcome::Committed {
                line_amount: 3,
                remaining_stock: 7,
                merged: true
            }
        );
    }

    #[tokio::test]
    async fn commit_leaves_state_untouched_when_stock_is_short() {
        let gw = seeded();
        let cmd = AddGood::new(order_id(1), good_id(5), 11).unwrap();

        assert_eq!(
            gw.commit_add_good(&cmd).await.unwrap(),
            CommitOutcome::InsufficientStock { available: 10 }
        );
        assert_eq!(gw.snapshot_good(good_id(5)).unwrap().amount(), 10);
        assert!(gw.snapshot_line(order_id(1), good_id(5)).is_none());
    }

    #[tokio::test]
    async fn commit_for_unknown_order_rolls_back_stock() {
        let gw = seeded();
        let cmd = AddGood::new(order_id(42), good_id(5), 1).unwrap();

        assert_eq!(
            gw.commit_add_good(&cmd).await.unwrap(),
            CommitOutcome::LineWriteFailed
        );
        assert_eq!(gw.snapshot_good(good_id(5)).unwrap().amount(), 10);
    }

    #[tokio::test]
    async fn commit_for_missing_good_reports_vanished() {
        let gw = seeded();
        let cmd = AddGood::new(order_id(1), good_id(6), 1).unwrap();
        assert_eq!(
            gw.commit_add_good(&cmd).await.unwrap(),
            CommitOutcome::GoodVanished
        );
    }
}
