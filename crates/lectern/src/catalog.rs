//! Catalog lookups backing the asynchronous validation rules.

use crate::client::StoreClient;
use crate::error::CatalogResult;

/// The lookup capability the validation engine is constructed with.
///
/// Production code injects [`PgCatalog`]; tests inject an in-memory double.
/// Every method is a single read; uniqueness stays read-then-decide, with
/// the store's own constraints as the backstop under concurrency.
pub trait CatalogLookup: Send + Sync {
    /// Id of the user registered under `username`, if any.
    fn find_user_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = CatalogResult<Option<i64>>> + Send;

    /// Id of the book carrying `title`, if any.
    fn find_book_by_title(
        &self,
        title: &str,
    ) -> impl std::future::Future<Output = CatalogResult<Option<i64>>> + Send;

    /// Id of the book carrying `isbn13`, if any.
    fn find_book_by_isbn13(
        &self,
        isbn13: &str,
    ) -> impl std::future::Future<Output = CatalogResult<Option<i64>>> + Send;

    /// Whether a book row with this id exists.
    fn book_exists(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = CatalogResult<bool>> + Send;

    /// Whether a category row with this id exists.
    fn category_exists(
        &self,
        id: i64,
    ) -> impl std::future::Future<Output = CatalogResult<bool>> + Send;
}

/// Postgres-backed lookups, each a fixed-shape single-statement query
/// issued through the wrapped [`StoreClient`].
pub struct PgCatalog<C> {
    client: C,
}

impl<C> PgCatalog<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn into_inner(self) -> C {
        self.client
    }
}

impl<C: StoreClient> CatalogLookup for PgCatalog<C> {
    async fn find_user_by_username(&self, username: &str) -> CatalogResult<Option<i64>> {
        let row = self
            .client
            .execute_opt("SELECT id FROM users WHERE username = $1", &[&username])
            .await?;
        Ok(row.map(|r| r.try_get(0)).transpose()?)
    }

    async fn find_book_by_title(&self, title: &str) -> CatalogResult<Option<i64>> {
        let row = self
            .client
            .execute_opt("SELECT id FROM books WHERE title = $1", &[&title])
            .await?;
        Ok(row.map(|r| r.try_get(0)).transpose()?)
    }

    async fn find_book_by_isbn13(&self, isbn13: &str) -> CatalogResult<Option<i64>> {
        let row = self
            .client
            .execute_opt("SELECT id FROM books WHERE isbn13 = $1", &[&isbn13])
            .await?;
        Ok(row.map(|r| r.try_get(0)).transpose()?)
    }

    async fn book_exists(&self, id: i64) -> CatalogResult<bool> {
        let row = self
            .client
            .execute_opt("SELECT id FROM books WHERE id = $1", &[&id])
            .await?;
        Ok(row.is_some())
    }

    async fn category_exists(&self, id: i64) -> CatalogResult<bool> {
        let row = self
            .client
            .execute_opt("SELECT id FROM categories WHERE id = $1", &[&id])
            .await?;
        Ok(row.is_some())
    }
}
