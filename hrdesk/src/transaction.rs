use futures::future::BoxFuture;
use sqlx::any::{AnyArguments, AnyQueryResult, AnyRow};
use tokio::sync::Mutex;

use crate::database::{Connection, Drivers};

/// A wrapper around a SQLx transaction.
///
/// Provides a way to execute multiple statements atomically. If any statement fails,
/// the transaction can be rolled back. If all succeed, it can be committed.
/// Dropping it without committing rolls back as well.
#[derive(Debug)]
pub struct Transaction {
    tx: Mutex<Option<sqlx::Transaction<'static, sqlx::Any>>>,
    driver: Drivers,
}

fn finished() -> sqlx::Error {
    sqlx::Error::Protocol("transaction already finished".to_string())
}

/// Implementation of Connection for a Transaction.
///
/// Statement builders take `&impl Connection`, so the inner transaction sits behind a
/// mutex and is locked for the duration of each statement.
impl Connection for Transaction {
    fn driver(&self) -> Drivers {
        self.driver
    }
    fn execute<'a, 'q: 'a>(&'a self, sql: &'q str, args: AnyArguments<'q>) -> BoxFuture<'a, Result<AnyQueryResult, sqlx::Error>> {
        Box::pin(async move {
            let mut guard = self.tx.lock().await;
            let tx = guard.as_mut().ok_or_else(finished)?;
            sqlx::query_with(sql, args).execute(&mut **tx).await
        })
    }
    fn fetch_all<'a, 'q: 'a>(&'a self, sql: &'q str, args: AnyArguments<'q>) -> BoxFuture<'a, Result<Vec<AnyRow>, sqlx::Error>> {
        Box::pin(async move {
            let mut guard = self.tx.lock().await;
            let tx = guard.as_mut().ok_or_else(finished)?;
            sqlx::query_with(sql, args).fetch_all(&mut **tx).await
        })
    }
    fn fetch_one<'a, 'q: 'a>(&'a self, sql: &'q str, args: AnyArguments<'q>) -> BoxFuture<'a, Result<AnyRow, sqlx::Error>> {
        Box::pin(async move {
            let mut guard = self.tx.lock().await;
            let tx = guard.as_mut().ok_or_else(finished)?;
            sqlx::query_with(sql, args).fetch_one(&mut **tx).await
        })
    }
    fn fetch_optional<'a, 'q: 'a>(&'a self, sql: &'q str, args: AnyArguments<'q>) -> BoxFuture<'a, Result<Option<AnyRow>, sqlx::Error>> {
        Box::pin(async move {
            let mut guard = self.tx.lock().await;
            let tx = guard.as_mut().ok_or_else(finished)?;
            sqlx::query_with(sql, args).fetch_optional(&mut **tx).await
        })
    }
}

impl Transaction {
    pub(crate) fn new(tx: sqlx::Transaction<'static, sqlx::Any>, driver: Drivers) -> Self {
        Self { tx: Mutex::new(Some(tx)), driver }
    }

    /// Commits the transaction.
    ///
    /// Persists all changes made during the transaction to the database.
    pub async fn commit(self) -> Result<(), sqlx::Error> {
        match self.tx.into_inner() {
            Some(tx) => tx.commit().await,
            None => Err(finished()),
        }
    }

    /// Rolls back the transaction.
    ///
    /// Reverts all changes made during the transaction. This happens automatically
    /// if the `Transaction` is dropped without being committed, but this method
    /// allows for explicit rollback.
    pub async fn rollback(self) -> Result<(), sqlx::Error> {
        match self.tx.into_inner() {
            Some(tx) => tx.rollback().await,
            None => Err(finished()),
        }
    }
}
