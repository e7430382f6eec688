//! Administrative CRUD over the catalog tables.
//!
//! Bypasses verification entirely and edits rows by position. This is the
//! operator escape hatch for fixing credentials or pruning entries.

use crate::error::AdminError;
use crate::storage::{Row, RowStore, TableId, Tables};
use crate::util::timestamp;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub id: &'static str,
    pub name: &'static str,
}

pub type AdminResult<T> = std::result::Result<T, AdminError>;

pub struct AdminService {
    tables: Arc<Tables>,
}

impl AdminService {
    pub fn new(tables: Arc<Tables>) -> Self {
        Self { tables }
    }

    pub fn list_tables(&self) -> Vec<TableInfo> {
        TableId::ALL
            .into_iter()
            .map(|id| TableInfo {
                id: id.slug(),
                name: id.display_name(),
            })
            .collect()
    }

    pub fn rows(&self, table: &str) -> AdminResult<Vec<Row>> {
        Ok(self.store(table)?.1.load()?.rows)
    }

    pub fn schema(&self, table: &str) -> AdminResult<Vec<String>> {
        Ok(self.store(table)?.1.schema()?)
    }

    /// Append a row. Entry tables get the current time as `timestamp`
    /// unless the payload carries one.
    pub fn insert(&self, table: &str, payload: &Value) -> AdminResult<Vec<Row>> {
        let (id, store) = self.store(table)?;
        let mut row = to_row(payload)?;
        if id.is_entry_log() && !row.contains_key("timestamp") {
            row.insert("timestamp".to_string(), timestamp::now_formatted());
        }

        let rows = store.append(row)?.rows;
        info!("Inserted row into {} ({} rows)", id, rows.len());
        Ok(rows)
    }

    /// Overwrite the given fields of row `index`. Fields outside the schema are ignored.
    pub fn update(&self, table: &str, index: i64, payload: &Value) -> AdminResult<Vec<Row>> {
        let (id, store) = self.store(table)?;
        let fields = to_row(payload)?;

        let rows = store.update_fields(index, &fields)?.rows;
        info!("Updated row {} of {}", index, id);
        Ok(rows)
    }

    pub fn delete(&self, table: &str, index: i64) -> AdminResult<Vec<Row>> {
        let (id, store) = self.store(table)?;

        let rows = store.delete(index)?.rows;
        info!("Deleted row {} of {} ({} rows left)", index, id, rows.len());
        Ok(rows)
    }

    fn store(&self, table: &str) -> AdminResult<(TableId, &RowStore)> {
        let id: TableId = table
            .parse()
            .map_err(|_| AdminError::TableNotFound(table.to_string()))?;
        Ok((id, self.tables.get(id)))
    }
}

/// Flatten a JSON object into string cells.
fn to_row(payload: &Value) -> AdminResult<Row> {
    let object: &Map<String, Value> = payload.as_object().ok_or(AdminError::NotAnObject)?;
    Ok(object
        .iter()
        .map(|(k, v)| (k.clone(), cell_text(v)))
        .collect())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
