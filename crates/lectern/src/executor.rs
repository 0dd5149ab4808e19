//! One-shot statement execution over scoped connections.

use crate::client::StoreClient;
use crate::error::{CatalogError, CatalogResult};
use crate::paging::{Page, PageRequest, paged_statement};
use std::time::Duration;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Config, NoTls, Row};

/// Default per-statement deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Executes one parameterized statement per call over its own connection.
///
/// No pooling: every call connects, runs the statement under a deadline and
/// closes the connection. The release happens exactly once on every exit
/// path — success, store error, elapsed deadline, or the caller dropping
/// the future — because dropping the client terminates the connection and
/// the driver task drains itself once the socket shuts down.
///
/// Errors from the store are propagated unchanged (constraint conflicts
/// aside, which map to their own variants); there are no retries.
#[derive(Clone)]
pub struct Executor {
    config: Config,
    timeout: Duration,
}

impl Executor {
    /// Build an executor from a database URL.
    pub fn new(database_url: &str) -> CatalogResult<Self> {
        let config = database_url
            .parse()
            .map_err(|e: tokio_postgres::Error| CatalogError::Connection(e.to_string()))?;
        Ok(Self {
            config,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the per-statement deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one parameterized statement and return all rows.
    pub async fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> CatalogResult<Vec<Row>> {
        let (client, connection) = tokio::time::timeout(self.timeout, self.config.connect(NoTls))
            .await
            .map_err(|_| CatalogError::Timeout(self.timeout))?
            .map_err(|e| CatalogError::Connection(e.to_string()))?;

        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(error = %e, "connection driver terminated");
            }
        });

        tracing::debug!(sql, params = params.len(), "executing statement");

        let result = tokio::time::timeout(self.timeout, client.query(sql, params)).await;

        // Dropping the client closes the connection; the detached driver
        // task exits on its own once the socket shuts down.
        drop(client);
        drop(driver);

        match result {
            Ok(rows) => rows.map_err(CatalogError::from_db_error),
            Err(_) => Err(CatalogError::Timeout(self.timeout)),
        }
    }

    /// Append `LIMIT`/`OFFSET` placeholders after `params` and execute.
    ///
    /// The two paging parameters land at `params.len() + 1` and
    /// `params.len() + 2`; callers must not pre-append their own. The
    /// returned [`Page`] echoes the *requested* limit/offset verbatim, not
    /// the coerced values the statement ran with.
    pub async fn execute_paged(
        &self,
        sql: &str,
        page: &PageRequest,
        params: &[&(dyn ToSql + Sync)],
    ) -> CatalogResult<Page> {
        let statement = paged_statement(sql, params.len());
        let limit = page.coerced_limit();
        let offset = page.coerced_offset();

        let mut bound: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(params.len() + 2);
        bound.extend_from_slice(params);
        bound.push(&limit);
        bound.push(&offset);

        let items = self.execute(&statement, &bound).await?;

        Ok(Page {
            items,
            limit: page.limit.clone(),
            offset: page.offset.clone(),
        })
    }
}

impl StoreClient for Executor {
    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CatalogResult<Vec<Row>> {
        Executor::execute(self, sql, params).await
    }
}
