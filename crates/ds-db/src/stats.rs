//! Table statistics gathering
//!
//! Issues a bounded, read-only query set per table: one combined
//! aggregate (row count + per-column distinct counts and null sums), one
//! min/max query over range-capable columns, one top-5 sample-values
//! query per column, one optional time-range query, and one best-effort
//! size lookup. Every query is attempted exactly once — no retries — and
//! any failure below the schema introspection is absorbed, leaving that
//! statistic absent.

use crate::error::DbResult;
use crate::traits::Warehouse;
use ds_core::sql_utils::quote_ident;
use ds_core::{ColumnDef, ColumnStatistics, TableStatisticsProfile, TimeRange, TypeClass};

/// Statistics gatherer over a [`Warehouse`].
pub struct StatisticsGatherer<'a> {
    warehouse: &'a dyn Warehouse,
}

/// How many sample values the frequency query returns per column.
const SAMPLE_LIMIT: usize = 5;

impl<'a> StatisticsGatherer<'a> {
    /// Create a gatherer over a warehouse.
    pub fn new(warehouse: &'a dyn Warehouse) -> Self {
        Self { warehouse }
    }

    /// Profile one table.
    ///
    /// Schema introspection failure propagates (nothing can be profiled
    /// without a column list); everything below it is absorbed.
    pub async fn profile_table(
        &self,
        schema: &str,
        table: &str,
    ) -> DbResult<TableStatisticsProfile> {
        let columns = self.warehouse.get_table_schema(schema, table).await?;
        let relation = format!("{}.{}", quote_ident(schema), quote_ident(table));

        let mut stats: Vec<ColumnStatistics> = columns
            .iter()
            .map(|c| ColumnStatistics {
                name: c.name.clone(),
                data_type: c.data_type.clone(),
                nullable: c.nullable,
                ..ColumnStatistics::default()
            })
            .collect();

        let row_count = self
            .gather_aggregates(&relation, &columns, &mut stats)
            .await;
        self.gather_min_max(&relation, &columns, &mut stats).await;
        self.gather_sample_values(&relation, &columns, &mut stats)
            .await;
        let time_range = self.gather_time_range(&relation, &columns).await;
        let size_bytes = self.gather_size_bytes(schema, table).await;

        Ok(TableStatisticsProfile {
            schema: schema.to_string(),
            table: table.to_string(),
            row_count,
            size_bytes,
            columns: stats,
            time_range,
        })
    }

    /// One combined aggregate query: row count plus per-column distinct
    /// count and null sum. Falls back to a bare `COUNT(*)` when the
    /// combined query fails.
    async fn gather_aggregates(
        &self,
        relation: &str,
        columns: &[ColumnDef],
        stats: &mut [ColumnStatistics],
    ) -> u64 {
        let mut select_list = vec!["COUNT(*) AS row_count".to_string()];
        for (i, col) in columns.iter().enumerate() {
            let ident = quote_ident(&col.name);
            select_list.push(format!("COUNT(DISTINCT {ident}) AS c{i}_distinct"));
            select_list.push(format!(
                "CAST(COALESCE(SUM(CASE WHEN {ident} IS NULL THEN 1 ELSE 0 END), 0) AS BIGINT) AS c{i}_nulls"
            ));
        }
        let sql = format!("SELECT {} FROM {relation}", select_list.join(", "));

        match self.warehouse.query(&sql).await {
            Ok(result) => {
                let row_count = result.value_u64(0, "row_count").unwrap_or(0);
                for (i, stat) in stats.iter_mut().enumerate() {
                    stat.distinct_count = result.value_u64(0, &format!("c{i}_distinct"));
                    let nulls = result.value_u64(0, &format!("c{i}_nulls"));
                    stat.null_percent = nulls.map(|n| {
                        if row_count == 0 {
                            0.0
                        } else {
                            (n as f64 / row_count as f64) * 100.0
                        }
                    });
                }
                row_count
            }
            Err(e) => {
                log::warn!("Aggregate statistics query failed for {relation}: {e}");
                self.fallback_row_count(relation).await
            }
        }
    }

    async fn fallback_row_count(&self, relation: &str) -> u64 {
        let sql = format!("SELECT COUNT(*) AS row_count FROM {relation}");
        match self.warehouse.query(&sql).await {
            Ok(result) => result.value_u64(0, "row_count").unwrap_or(0),
            Err(e) => {
                log::warn!("Row count query failed for {relation}: {e}");
                0
            }
        }
    }

    /// One min/max query covering every numeric or temporal column.
    async fn gather_min_max(
        &self,
        relation: &str,
        columns: &[ColumnDef],
        stats: &mut [ColumnStatistics],
    ) {
        let range_cols: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| TypeClass::of(&c.data_type).has_range())
            .map(|(i, _)| i)
            .collect();
        if range_cols.is_empty() {
            return;
        }

        let select_list: Vec<String> = range_cols
            .iter()
            .flat_map(|&i| {
                let ident = quote_ident(&columns[i].name);
                [
                    format!("CAST(MIN({ident}) AS VARCHAR) AS c{i}_min"),
                    format!("CAST(MAX({ident}) AS VARCHAR) AS c{i}_max"),
                ]
            })
            .collect();
        let sql = format!("SELECT {} FROM {relation}", select_list.join(", "));

        match self.warehouse.query(&sql).await {
            Ok(result) => {
                for &i in &range_cols {
                    stats[i].min = result.value_string(0, &format!("c{i}_min"));
                    stats[i].max = result.value_string(0, &format!("c{i}_max"));
                }
            }
            Err(e) => {
                log::warn!("Min/max query failed for {relation}: {e}");
            }
        }
    }

    /// One top-N-by-frequency query per column; each failure is absorbed
    /// independently.
    async fn gather_sample_values(
        &self,
        relation: &str,
        columns: &[ColumnDef],
        stats: &mut [ColumnStatistics],
    ) {
        for (i, col) in columns.iter().enumerate() {
            let ident = quote_ident(&col.name);
            let sql = format!(
                "SELECT CAST({ident} AS VARCHAR) AS v, COUNT(*) AS n \
                 FROM {relation} WHERE {ident} IS NOT NULL \
                 GROUP BY v ORDER BY n DESC, v LIMIT {SAMPLE_LIMIT}"
            );
            match self.warehouse.query(&sql).await {
                Ok(result) => {
                    stats[i].sample_values = (0..result.rows.len())
                        .filter_map(|row| result.value_string(row, "v"))
                        .collect();
                }
                Err(e) => {
                    log::warn!("Sample values query failed for {relation}.{}: {e}", col.name);
                }
            }
        }
    }

    /// Optional time-range query on the first temporal column.
    async fn gather_time_range(
        &self,
        relation: &str,
        columns: &[ColumnDef],
    ) -> Option<TimeRange> {
        let temporal = columns
            .iter()
            .find(|c| TypeClass::of(&c.data_type) == TypeClass::Temporal)?;
        let ident = quote_ident(&temporal.name);
        let sql = format!(
            "SELECT CAST(MIN({ident}) AS VARCHAR) AS earliest, \
                    CAST(MAX({ident}) AS VARCHAR) AS latest \
             FROM {relation}"
        );

        match self.warehouse.query(&sql).await {
            Ok(result) => {
                let earliest = result.value_string(0, "earliest")?;
                let latest = result.value_string(0, "latest")?;
                Some(TimeRange {
                    column: temporal.name.clone(),
                    earliest,
                    latest,
                })
            }
            Err(e) => {
                log::warn!("Time range query failed for {relation}: {e}");
                None
            }
        }
    }

    /// Best-effort size lookup via `information_schema.tables.bytes`.
    ///
    /// Backends without that column (DuckDB among them) fail the query and
    /// the size stays unknown.
    async fn gather_size_bytes(&self, schema: &str, table: &str) -> Option<u64> {
        let sql = format!(
            "SELECT bytes FROM information_schema.tables \
             WHERE table_schema = '{}' AND table_name = '{}'",
            schema.replace('\'', "''"),
            table.replace('\'', "''")
        );
        match self.warehouse.query(&sql).await {
            Ok(result) => result.value_u64(0, "bytes"),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;
