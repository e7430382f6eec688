//! Data persistence layer.
//!
//! All state lives in flat CSV tables under one data directory:
//! - `csv`: record codec
//! - `row_store`: one locked table file with positional row access
//! - `catalog`: the fixed table set, seeding, and file names
//! - `migrations`: startup schema upgrades

pub mod catalog;
pub mod csv;
pub mod migrations;
pub mod row_store;

pub use catalog::{TableId, Tables};
pub use row_store::{Row, RowStore, Table};
