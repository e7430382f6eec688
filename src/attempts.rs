//! Per-team stage-two attempt counter.

use crate::error::{StoreError, StoreResult};
use crate::storage::{Row, RowStore, Table};

pub struct AttemptTracker<'a> {
    store: &'a RowStore,
}

impl<'a> AttemptTracker<'a> {
    pub fn new(store: &'a RowStore) -> Self {
        Self { store }
    }

    /// Count one more attempt for `team` and return the new total.
    /// A team seen for the first time starts at 1.
    pub fn record_attempt(&self, team: &str) -> StoreResult<u32> {
        self.store.modify(|table| {
            let next = match find(table, team) {
                Some(index) => {
                    let row = &table.rows[index];
                    parse_attempts(row)?
                        .checked_add(1)
                        .ok_or_else(|| StoreError::InvalidValue {
                            column: "attempts".to_string(),
                            value: row.get("attempts").cloned().unwrap_or_default(),
                        })?
                }
                None => {
                    table.push(counter_row(team, 1));
                    return Ok(1);
                }
            };
            set(table, team, next);
            Ok(next)
        })
    }

    /// Zero the counter for `team`. Teams without a row are left untouched.
    pub fn reset(&self, team: &str) -> StoreResult<()> {
        self.store.modify(|table| {
            set(table, team, 0);
            Ok(())
        })
    }

    /// Current count, or `None` if the team never attempted stage two.
    pub fn attempts(&self, team: &str) -> StoreResult<Option<u32>> {
        let table = self.store.load()?;
        find(&table, team)
            .map(|index| parse_attempts(&table.rows[index]))
            .transpose()
    }
}

fn find(table: &Table, team: &str) -> Option<usize> {
    table
        .rows
        .iter()
        .position(|row| row.get("team_number").map(|t| t.trim()) == Some(team))
}

fn set(table: &mut Table, team: &str, attempts: u32) {
    if let Some(index) = find(table, team) {
        table.rows[index].insert("attempts".to_string(), attempts.to_string());
    }
}

fn counter_row(team: &str, attempts: u32) -> Row {
    Row::from([
        ("team_number".to_string(), team.to_string()),
        ("attempts".to_string(), attempts.to_string()),
    ])
}

/// Blank cells read as 0; anything else must be a non-negative integer.
fn parse_attempts(row: &Row) -> StoreResult<u32> {
    let raw = row.get("attempts").map(|v| v.trim()).unwrap_or_default();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u32>()
        .or_else(|_| {
            // whole-valued floats such as `3.0`
            raw.parse::<f64>()
                .ok()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u32)
                .ok_or(())
        })
        .map_err(|_| StoreError::InvalidValue {
            column: "attempts".to_string(),
            value: raw.to_string(),
        })
}
