//! Offset/limit pagination for list queries.

use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Default page size, also substituted when the requested limit does not
/// parse as an integer.
pub const DEFAULT_LIMIT: i64 = 10;

/// Substituted when the requested *offset* does not parse as an integer.
///
/// The shipped behavior substitutes 10 here, not 0; callers depend on it,
/// so it stays. An absent offset still starts at 0.
pub const FALLBACK_OFFSET: i64 = 10;

/// Raw paging inputs as they arrive from a query string.
///
/// Values are kept verbatim so the [`Page`] envelope can echo exactly what
/// was requested; numeric coercion happens only when binding the statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageRequest {
    pub offset: Option<String>,
    pub limit: Option<String>,
}

impl PageRequest {
    /// Create a request from raw query-string values.
    pub fn new(offset: Option<String>, limit: Option<String>) -> Self {
        Self { offset, limit }
    }

    /// The limit the statement actually runs with.
    pub fn coerced_limit(&self) -> i64 {
        match &self.limit {
            Some(raw) => parse_integer(raw).unwrap_or(DEFAULT_LIMIT),
            None => DEFAULT_LIMIT,
        }
    }

    /// The offset the statement actually runs with.
    pub fn coerced_offset(&self) -> i64 {
        match &self.offset {
            Some(raw) => parse_integer(raw).unwrap_or(FALLBACK_OFFSET),
            None => 0,
        }
    }
}

/// One page of rows plus the echoed request values.
///
/// `limit` and `offset` repeat the raw requested values even when a default
/// was substituted for the statement itself.
#[derive(Debug)]
pub struct Page {
    pub items: Vec<Row>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Append `LIMIT $n OFFSET $m` to a base query, computing the placeholder
/// indices from the number of parameters the caller has already bound.
///
/// No ORDER BY is added; stable ordering is the caller's responsibility.
pub fn paged_statement(sql: &str, existing_params: usize) -> String {
    format!(
        "{} LIMIT ${} OFFSET ${}",
        sql,
        existing_params + 1,
        existing_params + 2
    )
}

/// Accepted lexical form: an optionally-signed decimal integer.
fn parse_integer(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}
