//! Strongly-typed identifiers used across the domain.
//!
//! Every identifier in this system is a positive integer assigned by storage.
//! The newtypes reject zero and negative values at construction, so a value
//! of type `OrderId` is always a valid key.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct OrderId(i64);

/// Identifier of a good (catalogue item with stock).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct GoodId(i64);

/// Identifier of the client owning an order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ClientId(i64);

/// Identifier of the catalogue a good belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct CatalogueId(i64);

macro_rules! impl_positive_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create an identifier, rejecting zero and negative values.
            pub fn new(value: i64) -> Result<Self, DomainError> {
                if value <= 0 {
                    return Err(DomainError::invalid_id(format!(
                        "{} must be positive, got {}",
                        $name, value
                    )));
                }
                Ok(Self(value))
            }

            pub fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl TryFrom<i64> for $t {
            type Error = DomainError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Self::new(raw)
            }
        }
    };
}

impl_positive_id!(OrderId, "OrderId");
impl_positive_id!(GoodId, "GoodId");
impl_positive_id!(ClientId, "ClientId");
impl_positive_id!(CatalogueId, "CatalogueId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_ids_are_rejected() {
        assert!(OrderId::new(0).is_err());
        assert!(GoodId::new(-3).is_err());
        assert!(matches!(ClientId::try_from(0), Err(DomainError::InvalidId(_))));
    }

    #[test]
    fn parses_from_string() {
        let id: GoodId = " 42 ".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert!("abc".parse::<OrderId>().is_err());
        assert!("0".parse::<OrderId>().is_err());
    }

    #[test]
    fn serde_rejects_non_positive_values() {
        let ok: OrderId = serde_json::from_str("7").unwrap();
        assert_eq!(ok.get(), 7);
        assert!(serde_json::from_str::<OrderId>("0").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "7");
    }
}
