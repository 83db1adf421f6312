//! Warehouse-observed table statistics types
//!
//! A [`TableStatisticsProfile`] is rebuilt from scratch on every profiling
//! pass and fully replaces any earlier profile for the same table; partial
//! mutation never happens. Individual fields are optional because any
//! single statistics query may fail and be absorbed (§ statistics
//! gatherer), leaving that statistic simply absent.

use serde::{Deserialize, Serialize};

/// A column as reported by warehouse schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,

    /// Warehouse type name (e.g. `VARCHAR`, `TIMESTAMP`)
    #[serde(rename = "type")]
    pub data_type: String,

    /// Whether the column admits NULLs
    pub nullable: bool,
}

/// Coarse classification of a warehouse type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    Numeric,
    Temporal,
    Text,
    Boolean,
    Other,
}

impl TypeClass {
    /// Classify a warehouse type name via a static lookup table.
    ///
    /// Parameterized types (`DECIMAL(10,2)`) classify by their base name.
    pub fn of(type_name: &str) -> Self {
        let base = type_name
            .split('(')
            .next()
            .unwrap_or(type_name)
            .trim()
            .to_ascii_uppercase();
        match base.as_str() {
            "TINYINT" | "SMALLINT" | "INTEGER" | "INT" | "BIGINT" | "HUGEINT" | "UTINYINT"
            | "USMALLINT" | "UINTEGER" | "UBIGINT" | "FLOAT" | "REAL" | "DOUBLE" | "DECIMAL"
            | "NUMERIC" | "NUMBER" => TypeClass::Numeric,
            "DATE" | "TIME" | "DATETIME" | "TIMESTAMP" | "TIMESTAMPTZ" | "TIMESTAMP_NS"
            | "TIMESTAMP_MS" | "TIMESTAMP_S" | "TIMESTAMP WITH TIME ZONE" => TypeClass::Temporal,
            "VARCHAR" | "CHAR" | "TEXT" | "STRING" | "BPCHAR" => TypeClass::Text,
            "BOOLEAN" | "BOOL" => TypeClass::Boolean,
            _ => TypeClass::Other,
        }
    }

    /// Whether min/max aggregation is meaningful for this class.
    pub fn has_range(self) -> bool {
        matches!(self, TypeClass::Numeric | TypeClass::Temporal)
    }
}

/// Column-level statistics observed in the warehouse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnStatistics {
    /// Column name
    pub name: String,

    /// Warehouse type name
    pub data_type: String,

    /// Whether the column admits NULLs
    pub nullable: bool,

    /// Number of distinct values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct_count: Option<u64>,

    /// Percentage of NULL values (0.0 - 100.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_percent: Option<f64>,

    /// Minimum value, rendered as text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,

    /// Maximum value, rendered as text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    /// Up to five most frequent values, rendered as text
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sample_values: Vec<String>,
}

/// Observed time range of a table's first temporal column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRange {
    /// Column the range was computed from
    pub column: String,

    /// Earliest observed value, rendered as text
    pub earliest: String,

    /// Latest observed value, rendered as text
    pub latest: String,
}

/// Full statistics profile for one warehouse table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatisticsProfile {
    /// Schema the table lives in
    pub schema: String,

    /// Table name
    pub table: String,

    /// Observed row count
    pub row_count: u64,

    /// Estimated on-disk size, when the backend reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    /// Per-column statistics, in warehouse-reported column order
    pub columns: Vec<ColumnStatistics>,

    /// Observed time range of the first temporal column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
}

impl TableStatisticsProfile {
    /// Qualified `schema.table` identifier.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_class_lookup() {
        assert_eq!(TypeClass::of("BIGINT"), TypeClass::Numeric);
        assert_eq!(TypeClass::of("decimal(10,2)"), TypeClass::Numeric);
        assert_eq!(TypeClass::of("TIMESTAMP"), TypeClass::Temporal);
        assert_eq!(TypeClass::of("Date"), TypeClass::Temporal);
        assert_eq!(TypeClass::of("VARCHAR"), TypeClass::Text);
        assert_eq!(TypeClass::of("BOOLEAN"), TypeClass::Boolean);
        assert_eq!(TypeClass::of("BLOB"), TypeClass::Other);
    }

    #[test]
    fn test_has_range() {
        assert!(TypeClass::of("DOUBLE").has_range());
        assert!(TypeClass::of("TIMESTAMP").has_range());
        assert!(!TypeClass::of("VARCHAR").has_range());
    }

    #[test]
    fn test_qualified_name() {
        let p = TableStatisticsProfile {
            schema: "analytics".into(),
            table: "dim_customers".into(),
            row_count: 0,
            size_bytes: None,
            columns: Vec::new(),
            time_range: None,
        };
        assert_eq!(p.qualified_name(), "analytics.dim_customers");
    }
}
