//! Flat-file table store.
//!
//! A table is an ordered list of rows with named columns, persisted as one CSV
//! file. Every mutation re-reads the file, applies the change and rewrites the
//! whole file before returning. Rows are addressed by their 0-based position;
//! deleting a row shifts everything after it down by one.

use crate::error::{StoreError, StoreResult};
use crate::storage::csv;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One record, keyed by column name in column order.
pub type Row = IndexMap<String, String>;

/// In-memory image of a table file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Append a record. Keys not yet in the schema become new columns
    /// (backfilled with `""`); columns missing from the record are left empty.
    pub fn push(&mut self, record: Row) {
        for key in record.keys() {
            if !self.has_column(key) {
                self.add_column(key, |_, _| String::new());
            }
        }

        let row = self
            .columns
            .iter()
            .map(|c| (c.clone(), record.get(c).cloned().unwrap_or_default()))
            .collect();
        self.rows.push(row);
    }

    /// Add a column, computing its value for every existing row.
    pub fn add_column<F>(&mut self, name: &str, mut value_for: F)
    where
        F: FnMut(usize, &Row) -> String,
    {
        if self.has_column(name) {
            return;
        }
        self.columns.push(name.to_string());
        for (index, row) in self.rows.iter_mut().enumerate() {
            let value = value_for(index, row);
            row.insert(name.to_string(), value);
        }
    }

    /// Set one field. Returns `false` (and changes nothing) if the column does not exist.
    pub fn set_field(&mut self, index: i64, field: &str, value: &str) -> StoreResult<bool> {
        let index = self.check_index(index)?;
        if !self.has_column(field) {
            return Ok(false);
        }
        self.rows[index].insert(field.to_string(), value.to_string());
        Ok(true)
    }

    /// Remove the row at `index`; later rows move down by one.
    pub fn remove(&mut self, index: i64) -> StoreResult<Row> {
        let index = self.check_index(index)?;
        Ok(self.rows.remove(index))
    }

    fn check_index(&self, index: i64) -> StoreResult<usize> {
        usize::try_from(index)
            .ok()
            .filter(|i| *i < self.rows.len())
            .ok_or(StoreError::OutOfRange {
                index,
                len: self.rows.len(),
            })
    }

    pub fn to_csv(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| row.get(c).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        csv::encode_document(&self.columns, &rows)
    }

    /// Parse a table file. Short rows are padded with empty cells.
    pub fn from_csv(path: &Path, text: &str) -> StoreResult<Self> {
        let records = csv::decode_records(text).map_err(|e| StoreError::Malformed {
            path: path.to_path_buf(),
            line: e.line,
            reason: e.reason,
        })?;

        let mut records = records.into_iter();
        let Some((_, header)) = records.next() else {
            return Err(StoreError::Malformed {
                path: path.to_path_buf(),
                line: 1,
                reason: "missing header row".to_string(),
            });
        };

        let mut table = Table::new(&header);
        for (line, fields) in records {
            if fields.len() > header.len() {
                return Err(StoreError::Malformed {
                    path: path.to_path_buf(),
                    line,
                    reason: format!(
                        "expected at most {} fields, found {}",
                        header.len(),
                        fields.len()
                    ),
                });
            }
            let mut values = fields.into_iter();
            let row = header
                .iter()
                .map(|c| (c.clone(), values.next().unwrap_or_default()))
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }
}

/// A single table file guarded by an in-process lock.
pub struct RowStore {
    path: PathBuf,
    columns: Vec<String>,
    seed: Vec<Vec<String>>,
    lock: Mutex<()>,
}

impl RowStore {
    /// Open a table, creating its file from `columns` and `seed` if absent.
    pub fn open<S: AsRef<str>>(
        path: impl Into<PathBuf>,
        columns: &[S],
        seed: &[&[&str]],
    ) -> StoreResult<Self> {
        let store = Self {
            path: path.into(),
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            seed: seed
                .iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
            lock: Mutex::new(()),
        };

        if !store.path.exists() {
            store.write(&store.initial_table())?;
            info!("Initialized table {:?}", store.path);
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> StoreResult<Table> {
        let _guard = self.lock.lock();
        self.read()
    }

    pub fn schema(&self) -> StoreResult<Vec<String>> {
        Ok(self.load()?.columns)
    }

    pub fn append(&self, record: Row) -> StoreResult<Table> {
        self.modify(|table| {
            table.push(record);
            Ok(table.clone())
        })
    }

    /// Set one field of one row. Unknown fields are ignored.
    pub fn update_field(&self, index: i64, field: &str, value: &str) -> StoreResult<Table> {
        self.modify(|table| {
            table.set_field(index, field, value)?;
            Ok(table.clone())
        })
    }

    /// Set several fields of one row. Unknown fields are ignored.
    pub fn update_fields(&self, index: i64, fields: &Row) -> StoreResult<Table> {
        self.modify(|table| {
            table.check_index(index)?;
            for (field, value) in fields {
                table.set_field(index, field, value)?;
            }
            Ok(table.clone())
        })
    }

    pub fn delete(&self, index: i64) -> StoreResult<Table> {
        self.modify(|table| {
            table.remove(index)?;
            Ok(table.clone())
        })
    }

    /// Read-modify-write under the table lock. The table is persisted only if
    /// `f` succeeds.
    pub fn modify<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Table) -> StoreResult<T>,
    {
        let _guard = self.lock.lock();
        let mut table = self.read()?;
        let out = f(&mut table)?;
        self.write(&table)?;
        Ok(out)
    }

    fn initial_table(&self) -> Table {
        let mut table = Table::new(&self.columns);
        for values in &self.seed {
            let row = self
                .columns
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect();
            table.push(row);
        }
        table
    }

    fn read(&self) -> StoreResult<Table> {
        if !self.path.exists() {
            let table = self.initial_table();
            self.write(&table)?;
            return Ok(table);
        }
        let text =
            std::fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        Table::from_csv(&self.path, &text)
    }

    fn write(&self, table: &Table) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
        tmp.write_all(table.to_csv().as_bytes())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;

        debug!("Wrote {} rows to {:?}", table.len(), self.path);
        Ok(())
    }
}
