//! Partial UPDATE construction for patch endpoints.

use crate::client::StoreClient;
use crate::error::{CatalogError, CatalogResult};
use serde_json::Value;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// Outcome of a conditional update.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// No candidate survived filtering; no statement was issued.
    Skipped,
    /// The statement ran but matched no row with the given id.
    NotFound,
    /// The updated row, as returned by `RETURNING *`.
    Updated(Row),
}

impl UpdateOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// The updated row, if one came back.
    pub fn updated(self) -> Option<Row> {
        match self {
            Self::Updated(row) => Some(row),
            _ => None,
        }
    }
}

/// Builds `UPDATE {table} SET .. WHERE id = $1 RETURNING *` from candidate
/// (field, value) pairs, keeping only usable entries.
///
/// Fields survive filtering only when they are JSON strings; values only
/// when they are strings or numbers. The two lists are filtered
/// independently, not pairwise, so the caller must supply pairs that are
/// already 1:1 aligned — a non-conforming entry ahead of valid ones would
/// silently shift the alignment. [`set`](Self::set) and
/// [`set_opt`](Self::set_opt) keep name and value together and cannot
/// misalign; prefer them over [`fields`](Self::fields)/[`values`](Self::values)
/// when building candidates one at a time.
#[derive(Debug, Clone, Default)]
pub struct ConditionalUpdate {
    table: String,
    id: i64,
    fields: Vec<Value>,
    values: Vec<Value>,
}

impl ConditionalUpdate {
    /// Target a table row; placeholder `$1` is reserved for the id.
    pub fn new(table: &str, id: i64) -> Self {
        Self {
            table: table.to_string(),
            id,
            fields: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Supply the candidate field names (non-strings are filtered out).
    pub fn fields(mut self, fields: Vec<Value>) -> Self {
        self.fields = fields;
        self
    }

    /// Supply the candidate values (non-scalars are filtered out).
    pub fn values(mut self, values: Vec<Value>) -> Self {
        self.values = values;
        self
    }

    /// Push one aligned (field, value) pair.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.push(Value::from(field));
        self.values.push(value.into());
        self
    }

    /// Push an aligned pair if the value is present (None => skip).
    pub fn set_opt(self, field: &str, value: Option<impl Into<Value>>) -> Self {
        if let Some(v) = value {
            self.set(field, v)
        } else {
            self
        }
    }

    /// Get the built SQL string, or `None` when there is nothing to update.
    pub fn to_sql(&self) -> CatalogResult<Option<String>> {
        Ok(self.build()?.map(|(sql, _)| sql))
    }

    /// Run the update through any store client.
    pub async fn execute(&self, conn: &impl StoreClient) -> CatalogResult<UpdateOutcome> {
        let Some((sql, params)) = self.build()? else {
            return Ok(UpdateOutcome::Skipped);
        };
        let params_ref: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p.as_ref() as _).collect();
        let rows = conn.execute(&sql, &params_ref).await?;
        Ok(match rows.into_iter().next() {
            Some(row) => UpdateOutcome::Updated(row),
            None => UpdateOutcome::NotFound,
        })
    }

    fn build(&self) -> CatalogResult<Option<(String, Vec<Box<dyn ToSql + Sync + Send>>)>> {
        let fields: Vec<&str> = self.fields.iter().filter_map(Value::as_str).collect();
        let values: Vec<&Value> = self
            .values
            .iter()
            .filter(|v| matches!(v, Value::String(_) | Value::Number(_)))
            .collect();

        if fields.is_empty() {
            return Ok(None);
        }

        if fields.len() != values.len() {
            tracing::error!(
                table = %self.table,
                fields = fields.len(),
                values = values.len(),
                "conditional update candidates misaligned"
            );
            return Err(CatalogError::structural(
                "fields and values must be of equal length",
            ));
        }

        // id is placeholder 1
        let assignments: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, field)| format!("{} = ${}", field, i + 2))
            .collect();

        let sql = format!(
            "UPDATE {} SET {} WHERE id = $1 RETURNING *",
            self.table,
            assignments.join(", ")
        );

        let mut params: Vec<Box<dyn ToSql + Sync + Send>> = Vec::with_capacity(values.len() + 1);
        params.push(Box::new(self.id));
        for value in values {
            params.push(bind_scalar(value));
        }

        Ok(Some((sql, params)))
    }
}

/// JSON strings bind as text, integral numbers as `int8`, the rest as
/// `float8`.
fn bind_scalar(value: &Value) -> Box<dyn ToSql + Sync + Send> {
    match value {
        Value::String(s) => Box::new(s.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Box::new(i),
            None => Box::new(n.as_f64().unwrap_or_default()),
        },
        // build() only passes strings and numbers through
        _ => Box::new(Option::<String>::None),
    }
}
