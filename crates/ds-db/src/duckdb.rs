//! DuckDB warehouse backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{QueryResult, Warehouse};
use async_trait::async_trait;
use ds_core::ColumnDef;
use duckdb::Connection;
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;

/// DuckDB-backed warehouse
pub struct DuckDbWarehouse {
    conn: Mutex<Connection>,
}

impl DuckDbWarehouse {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| DbError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Execute arbitrary SQL statements.
    ///
    /// Not part of [`Warehouse`] — the pipeline never writes. This exists
    /// for test fixtures and local setup scripts.
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(sql)
            .map_err(|e| DbError::Query(e.to_string()))
    }

    fn query_sync(&self, sql: &str) -> DbResult<QueryResult> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DbError::Query(format!("{}: {}", e, sql)))?;

        // DuckDB panics on `stmt.column_count()` before execution, so
        // collect rows via query_map first, then read column metadata.
        let rows: Vec<Vec<Value>> = stmt
            .query_map([], |row| {
                let col_count = row.as_ref().column_count();
                Ok((0..col_count).map(|i| get_column_value(row, i)).collect())
            })
            .map_err(|e| DbError::Query(format!("{}: {}", e, sql)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let column_count = stmt.column_count();
        let columns: Vec<String> = (0..column_count)
            .map(|i| {
                stmt.column_name(i)
                    .map_or("?".to_string(), |v| v.to_string())
            })
            .collect();

        Ok(QueryResult { columns, rows })
    }

    fn get_table_schema_sync(&self, schema: &str, table: &str) -> DbResult<Vec<ColumnDef>> {
        let sql = format!(
            "SELECT column_name, data_type, is_nullable \
             FROM information_schema.columns \
             WHERE table_schema = '{}' AND table_name = '{}' \
             ORDER BY ordinal_position",
            escape_literal(schema),
            escape_literal(table)
        );
        let result = self.query_sync(&sql)?;

        Ok(result
            .rows
            .iter()
            .map(|row| ColumnDef {
                name: value_text(&row[0]),
                data_type: value_text(&row[1]),
                nullable: value_text(&row[2]).eq_ignore_ascii_case("yes"),
            })
            .collect())
    }

    fn list_tables_sync(&self, schema: Option<&str>) -> DbResult<Vec<(String, String)>> {
        let mut sql = String::from(
            "SELECT table_schema, table_name FROM information_schema.tables \
             WHERE table_type = 'BASE TABLE' \
             AND table_schema NOT IN ('information_schema', 'pg_catalog')",
        );
        if let Some(schema) = schema {
            sql.push_str(&format!(" AND table_schema = '{}'", escape_literal(schema)));
        }
        sql.push_str(" ORDER BY table_schema, table_name");

        let result = self.query_sync(&sql)?;
        Ok(result
            .rows
            .iter()
            .map(|row| (value_text(&row[0]), value_text(&row[1])))
            .collect())
    }
}

#[async_trait]
impl Warehouse for DuckDbWarehouse {
    async fn query(&self, sql: &str) -> DbResult<QueryResult> {
        self.query_sync(sql)
    }

    async fn get_table_schema(&self, schema: &str, table: &str) -> DbResult<Vec<ColumnDef>> {
        self.get_table_schema_sync(schema, table)
    }

    async fn list_tables(&self, schema: Option<&str>) -> DbResult<Vec<(String, String)>> {
        self.list_tables_sync(schema)
    }

    fn warehouse_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Read a column value, trying i64 -> f64 -> bool -> String.
///
/// DuckDB returns `None`/type errors for mismatched reads, so the first
/// succeeding representation wins; anything unreadable becomes null.
fn get_column_value(row: &duckdb::Row<'_>, idx: usize) -> Value {
    if let Ok(Some(n)) = row.get::<_, Option<i64>>(idx) {
        return Value::from(n);
    }
    if let Ok(Some(f)) = row.get::<_, Option<f64>>(idx) {
        return Value::from(f);
    }
    if let Ok(Some(b)) = row.get::<_, Option<bool>>(idx) {
        return Value::from(b);
    }
    if let Ok(Some(s)) = row.get::<_, Option<String>>(idx) {
        return Value::from(s);
    }
    Value::Null
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Escape a string for interpolation into a single-quoted SQL literal.
fn escape_literal(s: &str) -> String {
    s.replace('\'', "''")
}
