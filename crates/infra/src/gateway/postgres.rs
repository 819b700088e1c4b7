//! Postgres-backed order gateway.
//!
//! ## Error Mapping
//!
//! | SQLx Error | Read methods | Write methods |
//! |------------|--------------|---------------|
//! | `Database` (statement rejected by the server) | `Unavailable` | `Ok(false)` / `LineWriteFailed` |
//! | `ColumnDecode` / `Decode` / `ColumnNotFound` | `Decode` | `Decode` |
//! | `PoolClosed`, `PoolTimedOut`, `Io`, `Tls`, `Protocol`, other | `Unavailable` | `Unavailable` |
//!
//! A rejected write statement (foreign key, check constraint, serialization
//! failure) is something the workflow reports as a failed write. Anything that
//! means the database could not be reached propagates as an error.
//!
//! ## Tables
//!
//! `orders(id, client_id)`, `goods(id, name, amount, price, catalogue_id)`,
//! `order_lines(order_id, good_id, amount)` with `(order_id, good_id)` unique.
//! See `sql/schema.sql`. Integer columns are cast to `BIGINT` on read so the
//! gateway also works against schemas that use `INTEGER`/`SERIAL`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};
use tracing::{instrument, warn};

use orderdesk_core::{CatalogueId, ClientId, GoodId, OrderId};
use orderdesk_inventory::Good;
use orderdesk_sales::{AddGood, Order, OrderedGood};

use super::r#trait::{CommitOutcome, GatewayError, OrderGateway};

/// Postgres implementation of [`OrderGateway`].
///
/// The pool is owned by [`crate::db::Database`] and handed in at startup.
#[derive(Debug, Clone)]
pub struct PostgresOrderGateway {
    pool: PgPool,
}

impl PostgresOrderGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderGateway for PostgresOrderGateway {
    #[instrument(skip(self), fields(order_id = %order_id), err)]
    async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>, GatewayError> {
        let row = sqlx::query(
            r#"
            SELECT id::BIGINT AS id, client_id::BIGINT AS client_id
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_order", e))?;

        row.map(|r| decode_row::<OrderRow>("order", &r)?.try_into())
            .transpose()
    }

    #[instrument(skip(self), fields(good_id = %good_id), err)]
    async fn find_good(&self, good_id: GoodId) -> Result<Option<Good>, GatewayError> {
        let row = sqlx::query(
            r#"
            SELECT
                id::BIGINT AS id,
                name,
                amount::BIGINT AS amount,
                price::NUMERIC AS price,
                catalogue_id::BIGINT AS catalogue_id
            FROM goods
            WHERE id = $1
            "#,
        )
        .bind(good_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_good", e))?;

        row.map(|r| decode_row::<GoodRow>("good", &r)?.try_into())
            .transpose()
    }

    #[instrument(skip(self), fields(order_id = %order_id), err)]
    async fn list_order_lines(&self, order_id: OrderId) -> Result<Vec<OrderedGood>, GatewayError> {
        let rows = sqlx::query(
            r#"
            SELECT
                order_id::BIGINT AS order_id,
                good_id::BIGINT AS good_id,
                amount::BIGINT AS amount
            FROM order_lines
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_order_lines", e))?;

        rows.iter()
            .map(|r| decode_row::<OrderLineRow>("order line", r)?.try_into())
            .collect()
    }

    #[instrument(
        skip(self, line),
        fields(order_id = %line.order_id(), good_id = %line.good_id(), amount = line.amount()),
        err
    )]
    async fn upsert_order_line(&self, line: &OrderedGood) -> Result<bool, GatewayError> {
        let result = sqlx::query(
            r#"
            INSERT INTO order_lines (order_id, good_id, amount)
            VALUES ($1, $2, $3)
            ON CONFLICT (order_id, good_id)
            DO UPDATE SET amount = EXCLUDED.amount
            "#,
        )
        .bind(line.order_id().get())
        .bind(line.good_id().get())
        .bind(line.amount())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(e) => statement_failure_as_false("upsert_order_line", e),
        }
    }

    #[instrument(skip(self), fields(good_id = %good_id), err)]
    async fn set_good_amount(&self, good_id: GoodId, amount: i64) -> Result<bool, GatewayError> {
        let result = sqlx::query("UPDATE goods SET amount = $2 WHERE id = $1")
            .bind(good_id.get())
            .bind(amount)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            Err(e) => statement_failure_as_false("set_good_amount", e),
        }
    }

    #[instrument(skip(self), fields(order_id = %order_id, good_id = %good_id), err)]
    async fn delete_order_line(
        &self,
        order_id: OrderId,
        good_id: GoodId,
    ) -> Result<bool, GatewayError> {
        let result = sqlx::query("DELETE FROM order_lines WHERE order_id = $1 AND good_id = $2")
            .bind(order_id.get())
            .bind(good_id.get())
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            Err(e) => statement_failure_as_false("delete_order_line", e),
        }
    }

    /// Conditional decrement + incrementing upsert in one transaction.
    ///
    /// The `UPDATE ... WHERE amount >= $2` takes a row lock on the good, so
    /// concurrent commits for the same good serialize here and can never drive
    /// stock below zero.
    #[instrument(
        skip(self, cmd),
        fields(order_id = %cmd.order_id(), good_id = %cmd.good_id(), amount = cmd.amount()),
        err
    )]
    async fn commit_add_good(&self, cmd: &AddGood) -> Result<CommitOutcome, GatewayError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE goods
            SET amount = amount - $2
            WHERE id = $1 AND amount >= $2
            RETURNING amount::BIGINT
            "#,
        )
        .bind(cmd.good_id().get())
        .bind(cmd.amount())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("reserve_stock", e))?;

        let Some(remaining_stock) = remaining else {
            let available: Option<i64> =
                sqlx::query_scalar("SELECT amount::BIGINT FROM goods WHERE id = $1")
                    .bind(cmd.good_id().get())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error("read_stock", e))?;
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;

            return Ok(match available {
                Some(available) => CommitOutcome::InsufficientStock { available },
                None => CommitOutcome::GoodVanished,
            });
        };

        let line = sqlx::query(
            r#"
            INSERT INTO order_lines (order_id, good_id, amount)
            VALUES ($1, $2, $3)
            ON CONFLICT (order_id, good_id)
            DO UPDATE SET amount = order_lines.amount + EXCLUDED.amount
            RETURNING amount::BIGINT AS amount, (xmax = 0) AS inserted
            "#,
        )
        .bind(cmd.order_id().get())
        .bind(cmd.good_id().get())
        .bind(cmd.amount())
        .fetch_one(&mut *tx)
        .await;

        let row = match line {
            Ok(row) => row,
            Err(sqlx::Error::Database(db_err)) => {
                warn!(
                    operation = "commit_add_good",
                    error = %db_err.message(),
                    "order line write rejected; rolling back stock reservation"
                );
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Ok(CommitOutcome::LineWriteFailed);
            }
            Err(e) => return Err(map_sqlx_error("upsert_order_line", e)),
        };

        let line_amount: i64 = row
            .try_get("amount")
            .map_err(|e| GatewayError::decode("order line", e.to_string()))?;
        let inserted: bool = row
            .try_get("inserted")
            .map_err(|e| GatewayError::decode("order line", e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(CommitOutcome::Committed {
            line_amount,
            remaining_stock,
            merged: !inserted,
        })
    }

    #[instrument(skip(self), err)]
    async fn ping(&self) -> Result<(), GatewayError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| map_sqlx_error("ping", e))
    }
}

fn statement_failure_as_false(operation: &'static str, err: sqlx::Error) -> Result<bool, GatewayError> {
    match err {
        sqlx::Error::Database(db_err) => {
            warn!(operation, error = %db_err.message(), code = ?db_err.code(), "write rejected by database");
            Ok(false)
        }
        other => Err(map_sqlx_error(operation, other)),
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> GatewayError {
    match err {
        sqlx::Error::ColumnDecode { index, source } => {
            GatewayError::decode(operation, format!("column {index}: {source}"))
        }
        sqlx::Error::Decode(source) => GatewayError::decode(operation, source.to_string()),
        sqlx::Error::ColumnNotFound(column) => {
            GatewayError::decode(operation, format!("missing column {column}"))
        }
        sqlx::Error::PoolClosed => GatewayError::unavailable(operation, "connection pool closed"),
        sqlx::Error::PoolTimedOut => {
            GatewayError::unavailable(operation, "timed out acquiring a connection")
        }
        sqlx::Error::Database(db_err) => {
            GatewayError::unavailable(operation, format!("database error: {}", db_err.message()))
        }
        other => GatewayError::unavailable(operation, other.to_string()),
    }
}

fn decode_row<T>(entity: &'static str, row: &PgRow) -> Result<T, GatewayError>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    T::from_row(row).map_err(|e| GatewayError::decode(entity, e.to_string()))
}

// SQLx row types

#[derive(Debug)]
struct OrderRow {
    id: i64,
    client_id: i64,
}

impl<'r> FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderRow {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
        })
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = GatewayError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let id = OrderId::new(row.id).map_err(|e| GatewayError::decode("order", e.to_string()))?;
        let client_id =
            ClientId::new(row.client_id).map_err(|e| GatewayError::decode("order", e.to_string()))?;
        Ok(Order::new(id, client_id))
    }
}

#[derive(Debug)]
struct GoodRow {
    id: i64,
    name: String,
    amount: i64,
    price: Decimal,
    catalogue_id: Option<i64>,
}

impl<'r> FromRow<'r, PgRow> for GoodRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(GoodRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            amount: row.try_get("amount")?,
            price: row.try_get("price")?,
            catalogue_id: row.try_get("catalogue_id")?,
        })
    }
}

impl TryFrom<GoodRow> for Good {
    type Error = GatewayError;

    fn try_from(row: GoodRow) -> Result<Self, Self::Error> {
        let decode = |e: orderdesk_core::DomainError| GatewayError::decode("good", e.to_string());
        let id = GoodId::new(row.id).map_err(decode)?;
        let catalogue_id = row
            .catalogue_id
            .map(CatalogueId::new)
            .transpose()
            .map_err(decode)?;
        Good::new(id, row.name, row.amount, row.price, catalogue_id).map_err(decode)
    }
}

#[derive(Debug)]
struct OrderLineRow {
    order_id: i64,
    good_id: i64,
    amount: i64,
}

impl<'r> FromRow<'r, PgRow> for OrderLineRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderLineRow {
            order_id: row.try_get("order_id")?,
            good_id: row.try_get("good_id")?,
            amount: row.try_get("amount")?,
        })
    }
}

impl TryFrom<OrderLineRow> for OrderedGood {
    type Error = GatewayError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        let decode =
            |e: orderdesk_core::DomainError| GatewayError::decode("order line", e.to_string());
        let order_id = OrderId::new(row.order_id).map_err(decode)?;
        let good_id = GoodId::new(row.good_id).map_err(decode)?;
        OrderedGood::new(order_id, good_id, row.amount).map_err(decode)
    }
}
