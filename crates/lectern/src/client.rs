//! Store access trait for unified statement execution.

use crate::error::{CatalogError, CatalogResult};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A handle on the persistence collaborator.
///
/// Everything in this crate that talks to the store — validation lookups,
/// conditional updates, paged reads — goes through this trait, so callers
/// can hand in a plain connection, a transaction, a pooled client or the
/// one-shot [`Executor`](crate::Executor) interchangeably.
pub trait StoreClient: Send + Sync {
    /// Run one parameterized statement and return all rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = CatalogResult<Vec<Row>>> + Send;

    /// Run one parameterized statement and return the first row, if any.
    ///
    /// Semantics:
    /// - 0 rows: returns `Ok(None)`
    /// - 1 row: returns `Ok(Some(row))`
    /// - multiple rows: returns `Ok(Some(first_row))` (does **not** error)
    fn execute_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = CatalogResult<Option<Row>>> + Send {
        async move { Ok(self.execute(sql, params).await?.into_iter().next()) }
    }
}

impl StoreClient for tokio_postgres::Client {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CatalogResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(CatalogError::from_db_error)
    }
}

impl StoreClient for tokio_postgres::Transaction<'_> {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CatalogResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(CatalogError::from_db_error)
    }
}

#[cfg(feature = "pool")]
impl StoreClient for deadpool_postgres::Client {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CatalogResult<Vec<Row>> {
        // Delegate to the deref target (ClientWrapper / tokio_postgres::Client).
        StoreClient::execute(&***self, sql, params).await
    }
}

impl<C: StoreClient> StoreClient for &C {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CatalogResult<Vec<Row>> {
        (*self).execute(sql, params).await
    }

    fn execute_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = CatalogResult<Option<Row>>> + Send {
        (*self).execute_opt(sql, params)
    }
}
