//! Connection pool utilities

use crate::error::{CatalogError, CatalogResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from a database URL.
///
/// Uses `NoTls` and a small default size, suitable for local/dev. Pooled
/// clients implement [`StoreClient`](crate::StoreClient), so handlers that
/// outgrow the one-shot [`Executor`](crate::Executor) can switch without
/// touching the validation or query-construction layers.
pub fn create_pool(database_url: &str) -> CatalogResult<Pool> {
    create_pool_with_config(database_url, 16)
}

/// Create a connection pool with a custom maximum size.
pub fn create_pool_with_config(database_url: &str, max_size: usize) -> CatalogResult<Pool> {
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| CatalogError::Connection(e.to_string()))?;

    let mgr = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(mgr)
        .max_size(max_size)
        .build()
        .map_err(|e| CatalogError::Pool(e.to_string()))
}
