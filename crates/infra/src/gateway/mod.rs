//! Persistence gateway boundary.
//!
//! The workflow talks to storage only through [`OrderGateway`]. One concrete
//! implementation is chosen at startup: in-memory for tests/dev, Postgres for
//! real deployments.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryOrderGateway;
pub use postgres::PostgresOrderGateway;
pub use r#trait::{CommitOutcome, GatewayError, OrderGateway};
