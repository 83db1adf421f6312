//! Warehouse trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use ds_core::ColumnDef;
use serde_json::Value;

/// Result of one read-only query: column names plus rows of loosely-typed
/// values.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Column names, in select-list order
    pub columns: Vec<String>,

    /// Row values, one `Vec<Value>` per row
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at (row, column-name), if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Value at (row, column-name) as u64, tolerating float-typed counts.
    pub fn value_u64(&self, row: usize, column: &str) -> Option<u64> {
        match self.value(row, column)? {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
            _ => None,
        }
    }

    /// Value at (row, column-name) as f64.
    pub fn value_f64(&self, row: usize, column: &str) -> Option<f64> {
        self.value(row, column)?.as_f64()
    }

    /// Value at (row, column-name) rendered as text. Nulls yield `None`.
    pub fn value_string(&self, row: usize, column: &str) -> Option<String> {
        match self.value(row, column)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Read-only warehouse abstraction consumed by the profiling pipeline.
///
/// Implementations must be Send + Sync for async operation. Nothing in
/// this trait writes to the warehouse.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Execute a read-only query and return all rows.
    async fn query(&self, sql: &str) -> DbResult<QueryResult>;

    /// Introspect a table's columns, in warehouse-reported order.
    async fn get_table_schema(&self, schema: &str, table: &str) -> DbResult<Vec<ColumnDef>>;

    /// List base tables as (schema, table) pairs, optionally filtered to
    /// one schema.
    async fn list_tables(&self, schema: Option<&str>) -> DbResult<Vec<(String, String)>>;

    /// Warehouse type identifier for logging
    fn warehouse_type(&self) -> &'static str;
}
