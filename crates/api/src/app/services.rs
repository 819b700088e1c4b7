//! Storage wiring: picks the gateway implementation and owns the pool.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;

use orderdesk_core::{CatalogueId, ClientId, DomainError, GoodId, OrderId};
use orderdesk_infra::{
    AppConfig, ConsistencyMode, Database, GatewayError, InMemoryOrderGateway, OrderGateway,
    Reconciler,
};
use orderdesk_inventory::Good;
use orderdesk_sales::Order;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Storage(#[from] GatewayError),

    #[error("invalid demo data: {0}")]
    Seed(#[from] DomainError),
}

/// Shared state handed to every handler.
pub struct AppServices {
    pub reconciler: Reconciler<Arc<dyn OrderGateway>>,
    database: Option<Database>,
}

impl AppServices {
    pub fn new(gateway: Arc<dyn OrderGateway>, mode: ConsistencyMode) -> Self {
        Self {
            reconciler: Reconciler::new(gateway, mode),
            database: None,
        }
    }

    fn with_database(database: Database, mode: ConsistencyMode) -> Self {
        let gateway: Arc<dyn OrderGateway> = Arc::new(database.gateway());
        Self {
            reconciler: Reconciler::new(gateway, mode),
            database: Some(database),
        }
    }

    pub fn gateway(&self) -> &Arc<dyn OrderGateway> {
        self.reconciler.gateway()
    }

    /// Pool owner, present only when running against Postgres.
    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    if config.use_persistent_stores {
        let database = Database::connect(&config.database).await?;
        if config.database.apply_schema {
            database.apply_schema().await?;
        }
        return Ok(AppServices::with_database(database, config.consistency));
    }

    tracing::warn!("USE_PERSISTENT_STORES is not set; serving seeded in-memory demo data");
    Ok(AppServices::new(
        Arc::new(demo_gateway()?),
        config.consistency,
    ))
}

/// In-memory gateway with a small demo catalogue.
///
/// Orders 1 and 2 exist; good 1 has 5 units and good 5 has 10.
pub fn demo_gateway() -> Result<InMemoryOrderGateway, DomainError> {
    Ok(InMemoryOrderGateway::new()
        .with_order(Order::new(OrderId::new(1)?, ClientId::new(1)?))
        .with_order(Order::new(OrderId::new(2)?, ClientId::new(2)?))
        .with_good(Good::new(
            GoodId::new(1)?,
            "Bosch washing machine",
            5,
            Decimal::new(49_999, 2),
            Some(CatalogueId::new(1)?),
        )?)
        .with_good(Good::new(
            GoodId::new(5)?,
            "Electric kettle",
            10,
            Decimal::new(2_490, 2),
            Some(CatalogueId::new(1)?),
        )?))
}
