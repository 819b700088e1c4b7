use rust_decimal::Decimal;

use orderdesk_core::{CatalogueId, DomainError, DomainResult, Entity, GoodId};

/// A catalogue item with a price and on-hand stock.
///
/// `amount` is the number of units still available for future orders. It is
/// the only field the order workflow ever changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Good {
    id: GoodId,
    name: String,
    amount: i64,
    price: Decimal,
    catalogue_id: Option<CatalogueId>,
}

/// Requested quantity exceeds the stock on hand.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InsufficientStock {
    pub available: i64,
    pub requested: i64,
}

impl Good {
    pub fn new(
        id: GoodId,
        name: impl Into<String>,
        amount: i64,
        price: Decimal,
        catalogue_id: Option<CatalogueId>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("good name cannot be empty"));
        }
        if amount < 0 {
            return Err(DomainError::validation("stock amount cannot be negative"));
        }
        if price < Decimal::ZERO {
            return Err(DomainError::validation("price cannot be negative"));
        }

        Ok(Self {
            id,
            name,
            amount,
            price,
            catalogue_id,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn catalogue_id(&self) -> Option<CatalogueId> {
        self.catalogue_id
    }

    pub fn has_stock_for(&self, requested: i64) -> bool {
        self.amount >= requested
    }

    /// Compute the stock left after taking `requested` units.
    ///
    /// Pure decision: the caller persists the returned amount.
    pub fn reserve(&self, requested: i64) -> Result<i64, InsufficientStock> {
        if !self.has_stock_for(requested) {
            return Err(InsufficientStock {
                available: self.amount,
                requested,
            });
        }
        Ok(self.amount - requested)
    }

    /// Return a copy with the stock overwritten.
    pub fn with_amount(&self, amount: i64) -> DomainResult<Self> {
        if amount < 0 {
            return Err(DomainError::validation("stock amount cannot be negative"));
        }
        Ok(Self {
            amount,
            ..self.clone()
        })
    }
}

impl Entity for Good {
    type Id = GoodId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn good_with_stock(amount: i64) -> Good {
        Good::new(
            GoodId::new(5).unwrap(),
            "Bosch washing machine",
            amount,
            Decimal::new(49_999, 2),
            None,
        )
        .unwrap()
    }

    #[test]
    fn rejects_blank_name() {
        let err = Good::new(GoodId::new(1).unwrap(), "   ", 1, Decimal::ZERO, None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn rejects_negative_stock_and_price() {
        let id = GoodId::new(1).unwrap();
        assert!(Good::new(id, "Kettle", -1, Decimal::ZERO, None).is_err());
        assert!(Good::new(id, "Kettle", 1, Decimal::new(-1, 2), None).is_err());
    }

    #[test]
    fn reserving_exact_stock_leaves_zero() {
        let good = good_with_stock(10);
        assert_eq!(good.reserve(10), Ok(0));
    }

    #[test]
    fn reserving_one_more_than_stock_fails_with_available_amount() {
        let good = good_with_stock(10);
        assert_eq!(
            good.reserve(11),
            Err(InsufficientStock {
                available: 10,
                requested: 11
            })
        );
    }

    #[test]
    fn with_amount_keeps_other_fields() {
        let good = good_with_stock(10);
        let updated = good.with_amount(3).unwrap();
        assert_eq!(updated.amount(), 3);
        assert_eq!(updated.name(), good.name());
        assert_eq!(updated.price(), good.price());
        assert!(good.with_amount(-1).is_err());
    }

    #[test]
    fn catalogue_is_optional_and_kept_across_stock_updates() {
        let catalogue = CatalogueId::new(4).unwrap();
        let good = Good::new(GoodId::new(1).unwrap(), "Kettle", 2, Decimal::ONE, Some(catalogue))
            .unwrap();

        assert_eq!(good.catalogue_id(), Some(catalogue));
        assert_eq!(good.with_amount(0).unwrap().catalogue_id(), Some(catalogue));
        assert_eq!(good_with_stock(1).catalogue_id(), None);
    }

    proptest! {
        #[test]
        fn reserve_never_drives_stock_negative(stock in 0i64..10_000, requested in 1i64..20_000) {
            let good = good_with_stock(stock);
            match good.reserve(requested) {
                Ok(remaining) => {
                    prop_assert!(remaining >= 0);
                    prop_assert_eq!(remaining + requested, stock);
                }
                Err(short) => {
                    prop_assert!(requested > stock);
                    prop_assert_eq!(short.available, stock);
                }
            }
        }
    }
}
