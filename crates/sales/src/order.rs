use orderdesk_core::{ClientId, DomainError, DomainResult, Entity, GoodId, OrderId};

/// A placed customer order.
///
/// Orders are created elsewhere; this system only checks they exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    client_id: ClientId,
}

impl Order {
    pub fn new(id: OrderId, client_id: ClientId) -> Self {
        Self { id, client_id }
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Order line: quantity of one good attached to one order.
///
/// Identity is the `(order_id, good_id)` pair; at most one line exists per pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedGood {
    key: (OrderId, GoodId),
    amount: i64,
}

impl OrderedGood {
    pub fn new(order_id: OrderId, good_id: GoodId, amount: i64) -> DomainResult<Self> {
        if amount <= 0 {
            return Err(DomainError::validation("order line amount must be positive"));
        }
        Ok(Self {
            key: (order_id, good_id),
            amount,
        })
    }

    pub fn order_id(&self) -> OrderId {
        self.key.0
    }

    pub fn good_id(&self) -> GoodId {
        self.key.1
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }
}

impl Entity for OrderedGood {
    type Id = (OrderId, GoodId);

    fn id(&self) -> &Self::Id {
        &self.key
    }
}

/// Command: AddGood (add `amount` units of a good to an existing order).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddGood {
    order_id: OrderId,
    good_id: GoodId,
    amount: i64,
}

impl AddGood {
    pub fn new(order_id: OrderId, good_id: GoodId, amount: i64) -> DomainResult<Self> {
        if amount <= 0 {
            return Err(DomainError::validation("amount must be positive"));
        }
        Ok(Self {
            order_id,
            good_id,
            amount,
        })
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn good_id(&self) -> GoodId {
        self.good_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }
}

/// What to write for the order line of an `AddGood` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinePlan {
    /// No line exists for the pair yet.
    Insert(OrderedGood),
    /// A line exists; `line` carries the summed amount.
    Merge { previous: i64, line: OrderedGood },
}

impl LinePlan {
    /// Decide merge vs insert against the order's current lines.
    pub fn for_command(existing: &[OrderedGood], cmd: &AddGood) -> DomainResult<Self> {
        let current = existing
            .iter()
            .find(|l| l.key == (cmd.order_id, cmd.good_id));

        match current {
            Some(line) => {
                let merged = line
                    .amount
                    .checked_add(cmd.amount)
                    .ok_or_else(|| DomainError::validation("order line amount overflow"))?;
                Ok(LinePlan::Merge {
                    previous: line.amount,
                    line: OrderedGood::new(cmd.order_id, cmd.good_id, merged)?,
                })
            }
            None => Ok(LinePlan::Insert(OrderedGood::new(
                cmd.order_id,
                cmd.good_id,
                cmd.amount,
            )?)),
        }
    }

    pub fn line(&self) -> &OrderedGood {
        match self {
            LinePlan::Insert(line) => line,
            LinePlan::Merge { line, .. } => line,
        }
    }

    pub fn is_merge(&self) -> bool {
        matches!(self, LinePlan::Merge { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn order_id(v: i64) -> OrderId {
        OrderId::new(v).unwrap()
    }

    fn good_id(v: i64) -> GoodId {
        GoodId::new(v).unwrap()
    }

    #[test]
    fn order_keeps_its_client() {
        let order = Order::new(order_id(3), ClientId::new(9).unwrap());
        assert_eq!(order.client_id().get(), 9);
        assert_eq!(order.key(), order_id(3));
    }

    #[test]
    fn add_good_rejects_non_positive_amount() {
        assert!(AddGood::new(order_id(1), good_id(5), 0).is_err());
        assert!(AddGood::new(order_id(1), good_id(5), -2).is_err());
        assert!(AddGood::new(order_id(1), good_id(5), 1).is_ok());
    }

    #[test]
    fn order_line_amount_must_be_positive() {
        let err = OrderedGood::new(order_id(1), good_id(5), 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn plans_insert_when_order_has_no_line_for_good() {
        let existing = vec![OrderedGood::new(order_id(1), good_id(2), 4).unwrap()];
        let cmd = AddGood::new(order_id(1), good_id(5), 2).unwrap();

        let plan = LinePlan::for_command(&existing, &cmd).unwrap();

        assert!(!plan.is_merge());
        assert_eq!(plan.line().key(), (order_id(1), good_id(5)));
        assert_eq!(plan.line().amount(), 2);
    }

    #[test]
    fn plans_merge_when_line_exists() {
        let existing = vec![
            OrderedGood::new(order_id(1), good_id(2), 4).unwrap(),
            OrderedGood::new(order_id(1), good_id(5), 2).unwrap(),
        ];
        let cmd = AddGood::new(order_id(1), good_id(5), 1).unwrap();

        match LinePlan::for_command(&existing, &cmd).unwrap() {
            LinePlan::Merge { previous, line } => {
                assert_eq!(previous, 2);
                assert_eq!(line.amount(), 3);
                assert_eq!(line.good_id(), good_id(5));
            }
            other => panic!("expected merge, got {other:?}"),
        }
    }

    #[test]
    fn lines_of_other_orders_are_ignored() {
        let existing = vec![OrderedGood::new(order_id(2), good_id(5), 7).unwrap()];
        let cmd = AddGood::new(order_id(1), good_id(5), 1).unwrap();

        let plan = LinePlan::for_command(&existing, &cmd).unwrap();
        assert!(!plan.is_merge());
    }

    #[test]
    fn merge_overflow_is_a_validation_error() {
        let existing = vec![OrderedGood::new(order_id(1), good_id(5), i64::MAX).unwrap()];
        let cmd = AddGood::new(order_id(1), good_id(5), 1).unwrap();

        assert!(LinePlan::for_command(&existing, &cmd).is_err());
    }

    proptest! {
        #[test]
        fn merged_amount_is_sum_of_previous_and_requested(a in 1i64..1_000_000, b in 1i64..1_000_000) {
            let existing = vec![OrderedGood::new(order_id(3), good_id(9), a).unwrap()];
            let cmd = AddGood::new(order_id(3), good_id(9), b).unwrap();

            let plan = LinePlan::for_command(&existing, &cmd).unwrap();
            prop_assert!(plan.is_merge());
            prop_assert_eq!(plan.line().amount(), a + b);
        }
    }
}
