//! Add-good workflow: existence checks, stock sufficiency, merge-vs-insert of
//! the order line and the stock decrement.
//!
//! Expected business conditions (missing order, missing good, short stock,
//! rejected writes) come back as an [`AddGoodOutcome`]. Only storage failures
//! surface as `Err(GatewayError)`.

use std::fmt;
use std::ops::ControlFlow;
use std::str::FromStr;

use thiserror::Error;
use tracing::{Span, error, field, info, instrument, warn};

use orderdesk_sales::{AddGood, LinePlan};

use crate::gateway::{CommitOutcome, GatewayError, OrderGateway};

/// How the stock decrement and the line write are combined.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ConsistencyMode {
    /// Conditional decrement and line increment in one unit of work.
    #[default]
    Atomic,
    /// Two independent writes, stock first, no rollback.
    BestEffort,
}

impl ConsistencyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyMode::Atomic => "atomic",
            ConsistencyMode::BestEffort => "best_effort",
        }
    }
}

impl fmt::Display for ConsistencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown consistency mode {0:?} (expected atomic or best_effort)")]
pub struct UnknownConsistencyMode(pub String);

impl FromStr for ConsistencyMode {
    type Err = UnknownConsistencyMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(ConsistencyMode::Atomic),
            "best_effort" | "best-effort" => Ok(ConsistencyMode::BestEffort),
            _ => Err(UnknownConsistencyMode(s.to_string())),
        }
    }
}

/// Terminal result of one add-good call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AddGoodOutcome {
    OrderNotFound,
    GoodNotFound,
    InsufficientStock { available: i64, requested: i64 },
    StockUpdateFailed,
    LineUpdateFailed,
    Merged { line_amount: i64, remaining_stock: i64 },
    Created { line_amount: i64, remaining_stock: i64 },
}

impl AddGoodOutcome {
    /// Stable machine-readable name of the outcome.
    pub fn kind(&self) -> &'static str {
        match self {
            AddGoodOutcome::OrderNotFound => "ORDER_NOT_FOUND",
            AddGoodOutcome::GoodNotFound => "GOOD_NOT_FOUND",
            AddGoodOutcome::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AddGoodOutcome::StockUpdateFailed => "STOCK_UPDATE_FAILED",
            AddGoodOutcome::LineUpdateFailed => "LINE_UPDATE_FAILED",
            AddGoodOutcome::Merged { .. } => "MERGED",
            AddGoodOutcome::Created { .. } => "CREATED",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            AddGoodOutcome::Merged { .. } | AddGoodOutcome::Created { .. }
        )
    }
}

/// Runs the add-good workflow against an [`OrderGateway`].
///
/// Never retries. Each call performs at most one stock write and one line
/// write.
#[derive(Debug, Clone)]
pub struct Reconciler<G> {
    gateway: G,
    mode: ConsistencyMode,
}

impl<G> Reconciler<G>
where
    G: OrderGateway,
{
    pub fn new(gateway: G, mode: ConsistencyMode) -> Self {
        Self { gateway, mode }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn mode(&self) -> ConsistencyMode {
        self.mode
    }

    #[instrument(
        skip(self, cmd),
        fields(
            order_id = %cmd.order_id(),
            good_id = %cmd.good_id(),
            amount = cmd.amount(),
            mode = %self.mode,
            client_id = field::Empty,
            catalogue_id = field::Empty,
        ),
        err
    )]
    pub async fn add_good_to_order(&self, cmd: AddGood) -> Result<AddGoodOutcome, GatewayError> {
        let outcome = match self.mode {
            ConsistencyMode::Atomic => self.add_atomically(&cmd).await?,
            ConsistencyMode::BestEffort => self.add_best_effort(&cmd).await?,
        };

        match outcome {
            AddGoodOutcome::StockUpdateFailed => {
                warn!(outcome = outcome.kind(), "stock write failed; order line untouched");
            }
            AddGoodOutcome::LineUpdateFailed => {
                error!(outcome = outcome.kind(), "order line write failed");
            }
            _ => info!(outcome = outcome.kind(), "add-good finished"),
        }

        Ok(outcome)
    }

    /// Steps shared by both modes: order exists, good exists, stock covers the
    /// request. Continues with the stock level that would remain.
    async fn check_preconditions(
        &self,
        cmd: &AddGood,
    ) -> Result<ControlFlow<AddGoodOutcome, i64>, GatewayError> {
        let Some(order) = self.gateway.find_order(cmd.order_id()).await? else {
            return Ok(ControlFlow::Break(AddGoodOutcome::OrderNotFound));
        };
        Span::current().record("client_id", order.client_id().get());

        let Some(good) = self.gateway.find_good(cmd.good_id()).await? else {
            return Ok(ControlFlow::Break(AddGoodOutcome::GoodNotFound));
        };
        if let Some(catalogue_id) = good.catalogue_id() {
            Span::current().record("catalogue_id", catalogue_id.get());
        }

        Ok(match good.reserve(cmd.amount()) {
            Ok(remaining) => ControlFlow::Continue(remaining),
            Err(short) => ControlFlow::Break(AddGoodOutcome::InsufficientStock {
                available: short.available,
                requested: short.requested,
            }),
        })
    }

    async fn add_best_effort(&self, cmd: &AddGood) -> Result<AddGoodOutcome, GatewayError> {
        let remaining_stock = match self.check_preconditions(cmd).await? {
            ControlFlow::Continue(remaining) => remaining,
            ControlFlow::Break(outcome) => return Ok(outcome),
        };

        let lines = self.gateway.list_order_lines(cmd.order_id()).await?;
        let plan = match LinePlan::for_command(&lines, cmd) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(error = %e, "cannot compute order line");
                return Ok(AddGoodOutcome::LineUpdateFailed);
            }
        };

        // Stock is reserved first so a failure here never leaves a line
        // without its decrement.
        if !self
            .gateway
            .set_good_amount(cmd.good_id(), remaining_stock)
            .await?
        {
            return Ok(AddGoodOutcome::StockUpdateFailed);
        }

        if !self.gateway.upsert_order_line(plan.line()).await? {
            warn!(
                remaining_stock,
                "stock already decremented for a line that was not written"
            );
            return Ok(AddGoodOutcome::LineUpdateFailed);
        }

        let line_amount = plan.line().amount();
        Ok(if plan.is_merge() {
            AddGoodOutcome::Merged {
                line_amount,
                remaining_stock,
            }
        } else {
            AddGoodOutcome::Created {
                line_amount,
                remaining_stock,
            }
        })
    }

    async fn add_atomically(&self, cmd: &AddGood) -> Result<AddGoodOutcome, GatewayError> {
        if let ControlFlow::Break(outcome) = self.check_preconditions(cmd).await? {
            return Ok(outcome);
        }

        Ok(match self.gateway.commit_add_good(cmd).await? {
            CommitOutcome::Committed {
                line_amount,
                remaining_stock,
                merged: true,
            } => AddGoodOutcome::Merged {
                line_amount,
                remaining_stock,
            },
            CommitOutcome::Committed {
                line_amount,
                remaining_stock,
                merged: false,
            } => AddGoodOutcome::Created {
                line_amount,
                remaining_stock,
            },
            // Another request took the stock between the read and the write.
            CommitOutcome::InsufficientStock { available } => AddGoodOutcome::InsufficientStock {
                available,
                requested: cmd.amount(),
            },
            CommitOutcome::GoodVanished => AddGoodOutcome::StockUpdateFailed,
            CommitOutcome::LineWriteFailed => AddGoodOutcome::LineUpdateFailed,
        })
    }
}
