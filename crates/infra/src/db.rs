//! Connection pool lifecycle.
//!
//! The pool is created once at startup, handed to the Postgres gateway, and
//! closed after the HTTP server has drained.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, instrument};

use crate::config::DatabaseConfig;
use crate::gateway::{GatewayError, PostgresOrderGateway};

/// Idempotent DDL for `orders`, `goods` and `order_lines`.
pub const SCHEMA: &str = include_str!("../sql/schema.sql");

#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    #[instrument(skip(config), fields(min = config.min_connections, max = config.max_connections), err)]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| GatewayError::unavailable("connect", e.to_string()))?;

        info!("database pool ready");
        Ok(Self { pool })
    }

    #[instrument(skip(self), err)]
    pub async fn apply_schema(&self) -> Result<(), GatewayError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::unavailable("apply_schema", e.to_string()))?;
        info!("schema applied");
        Ok(())
    }

    pub fn gateway(&self) -> PostgresOrderGateway {
        PostgresOrderGateway::new(self.pool.clone())
    }

    /// Wait for checked-out connections to be returned, then close them all.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("database pool closed");
    }
}
