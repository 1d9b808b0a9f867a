//! # Transactional store
//!
//! `PgStore` owns the connection pool and the primitives every repository is
//! built on: error classification and the run-a-closure-in-one-transaction
//! wrapper. Business writes that span multiple statements go through
//! [`PgStore::in_txn`] so partial application is impossible.

use std::future::Future;
use std::pin::Pin;

use domains::error::{Error, Result};
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};

/// A boxed future tied to the borrow of the transaction connection.
pub type TxnFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'c>>;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(dsn)
            .await
            .map_err(map_db_err)?;
        Ok(PgStore { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "migration failed");
                Error::internal("migration failed")
            })
    }

    /// Runs `op` inside a single transaction: commit on success, rollback on
    /// any failure, propagating the innermost error.
    pub async fn in_txn<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut PgConnection) -> TxnFuture<'c, T> + Send,
    {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;
        match op(&mut tx).await {
            Ok(value) => {
                tx.commit().await.map_err(map_db_err)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rb_err) = tx.rollback().await {
                    tracing::error!(error = %rb_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Baseline classification of database failures.
///
/// "No rows" becomes a generic `NotFound` (repositories re-label it with the
/// entity name via [`map_not_found`]); unique-constraint violations become
/// `AlreadyExists`; anything else is logged here and surfaced as `Internal`
/// without the underlying message.
pub fn map_db_err(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::RowNotFound => Error::not_found("not found"),
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::already_exists("already exists")
        }
        _ => {
            tracing::error!(error = %err, "db error");
            Error::internal("db error")
        }
    }
}

/// Classifier that names the missing entity, e.g. "event not found".
pub fn map_not_found(entity: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |err| match err {
        sqlx::Error::RowNotFound => Error::not_found(format!("{entity} not found")),
        other => map_db_err(other),
    }
}

/// Classifier that names the conflicting entity on a unique violation,
/// e.g. "earmark already exists".
pub fn map_conflict(entity: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            Error::already_exists(format!("{entity} already exists"))
        }
        _ => map_db_err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::error::ErrorKind;

    #[test]
    fn row_not_found_is_classified() {
        let err = map_db_err(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = map_not_found("event")(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "event not found");
    }

    #[test]
    fn unexpected_failures_become_internal() {
        let err = map_db_err(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::Internal);
        // the pool detail stays in the logs, not the message
        assert_eq!(err.to_string(), "internal error: db error");
    }

    #[test]
    fn conflict_mapper_passes_through_not_found() {
        let err = map_conflict("earmark")(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
