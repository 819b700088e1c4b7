//! Infrastructure layer: storage gateways, the add-good workflow, config.

pub mod config;
pub mod db;
pub mod gateway;
pub mod reconciler;

pub use config::{AppConfig, ConfigError, DatabaseConfig};
pub use db::Database;
pub use gateway::{
    CommitOutcome, GatewayError, InMemoryOrderGateway, OrderGateway, PostgresOrderGateway,
};
pub use reconciler::{AddGoodOutcome, ConsistencyMode, Reconciler, UnknownConsistencyMode};
