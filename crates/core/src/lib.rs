//! Shared domain primitives for orderdesk: positive integer ids, the domain
//! error type and the `Entity` trait. No IO.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CatalogueId, ClientId, GoodId, OrderId};
