//! ds-db - Warehouse abstraction for Datascribe
//!
//! Provides the [`Warehouse`] trait consumed by the profiling pipeline,
//! a DuckDB-backed implementation, and the statistics gatherer that
//! turns a schema/table pair into a [`ds_core::TableStatisticsProfile`].

pub mod duckdb;
pub mod error;
pub mod stats;
pub mod traits;

pub use duckdb::DuckDbWarehouse;
pub use error::{DbError, DbResult};
pub use stats::StatisticsGatherer;
pub use traits::{QueryResult, Warehouse};
