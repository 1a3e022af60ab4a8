//! Database connection management

use std::{future::Future, time::Duration};

use sqlx::{
    PgPool, Postgres, Row, Transaction,
    migrate::MigrateError,
    postgres::{PgPoolOptions, PgRow},
    query,
};
use thiserror::Error;

/// SQL used to bound how long a transaction may wait on a row lock.
pub const SET_LOCK_TIMEOUT_SQL: &str = "SELECT set_config('lock_timeout', $1, true)";

/// SQL used to bound how long any single statement in a transaction may run.
pub const SET_STATEMENT_TIMEOUT_SQL: &str = "SELECT set_config('statement_timeout', $1, true)";

/// The caller-supplied deadline elapsed before the operation finished.
#[derive(Debug, Error)]
#[error("deadline of {0:?} exceeded")]
pub struct DeadlineExceeded(pub Duration);

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a plain transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when a connection cannot be acquired or `BEGIN` fails.
    pub async fn begin_transaction(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Begin a transaction whose lock waits and statements give up once `deadline` elapses.
    ///
    /// Both settings are transaction-local and vanish on commit or rollback.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or applying the timeouts fails.
    pub async fn begin_transaction_with_deadline(
        &self,
        deadline: Duration,
    ) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let millis = format!("{}ms", deadline.as_millis().max(1));

        query(SET_LOCK_TIMEOUT_SQL)
            .bind(&millis)
            .execute(&mut *tx)
            .await?;

        query(SET_STATEMENT_TIMEOUT_SQL)
            .bind(&millis)
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }
}

/// Run `operation`, failing with [`DeadlineExceeded`] if it has not completed within `deadline`.
///
/// A timed out operation is dropped; any transaction it held open is rolled back on drop.
///
/// # Errors
///
/// Returns the operation's own error, or the deadline error converted into `E`.
pub async fn with_deadline<T, E, F>(deadline: Duration, operation: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<DeadlineExceeded>,
{
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_elapsed) => Err(DeadlineExceeded(deadline).into()),
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Read a non-negative `BIGINT` money column.
pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount: i64 = row.try_get(col)?;

    u64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Read a non-negative `INTEGER` count column.
pub(crate) fn try_get_quantity(row: &PgRow, col: &str) -> Result<u32, sqlx::Error> {
    let quantity: i32 = row.try_get(col)?;

    u32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Convert a money amount for binding to a `BIGINT` column.
pub(crate) fn amount_param(amount: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::Encode(format!("{col}: {e}").into()))
}

/// Convert a count for binding to an `INTEGER` column.
pub(crate) fn quantity_param(quantity: u32, col: &str) -> Result<i32, sqlx::Error> {
    i32::try_from(quantity).map_err(|e| sqlx::Error::Encode(format!("{col}: {e}").into()))
}
