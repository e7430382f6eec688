//! Append-only log of successful verifications.

use crate::error::{StoreError, StoreResult};
use crate::storage::{Row, RowStore, Table};
use serde::{Deserialize, Serialize};

/// One successful verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub team_number: String,
    pub timestamp: String,
    /// Stage two only: attempts counted up to and including this success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    /// Stage two only: 1-based count of this team's entries, this one included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_number: Option<u32>,
}

impl EntryRecord {
    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("team_number".to_string(), self.team_number.clone());
        row.insert("timestamp".to_string(), self.timestamp.clone());
        if let Some(attempts) = self.attempts {
            row.insert("attempts".to_string(), attempts.to_string());
        }
        if let Some(entry_number) = self.entry_number {
            row.insert("entry_number".to_string(), entry_number.to_string());
        }
        row
    }

    fn from_row(row: &Row) -> StoreResult<Self> {
        let cell = |name: &str| row.get(name).map(|v| v.trim()).unwrap_or_default();
        Ok(Self {
            team_number: cell("team_number").to_string(),
            timestamp: cell("timestamp").to_string(),
            attempts: optional_count("attempts", cell("attempts"))?,
            entry_number: optional_count("entry_number", cell("entry_number"))?,
        })
    }
}

fn optional_count(column: &str, raw: &str) -> StoreResult<Option<u32>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| StoreError::InvalidValue {
            column: column.to_string(),
            value: raw.to_string(),
        })
}

pub struct EntryLog<'a> {
    store: &'a RowStore,
}

impl<'a> EntryLog<'a> {
    pub fn new(store: &'a RowStore) -> Self {
        Self { store }
    }

    /// Record a success for `team`.
    ///
    /// With `attempts` set (stage two), the row also carries the attempt count
    /// and the team's running `entry_number`, computed from the rows already
    /// in the log under the same lock as the append.
    pub fn append(
        &self,
        team: &str,
        timestamp: &str,
        attempts: Option<u32>,
    ) -> StoreResult<EntryRecord> {
        self.store.modify(|table| {
            let entry_number = attempts.map(|_| count_for(table, team) + 1);
            let record = EntryRecord {
                team_number: team.to_string(),
                timestamp: timestamp.to_string(),
                attempts,
                entry_number,
            };
            table.push(record.to_row());
            Ok(record)
        })
    }

    pub fn entries(&self) -> StoreResult<Vec<EntryRecord>> {
        self.store
            .load()?
            .rows
            .iter()
            .map(EntryRecord::from_row)
            .collect()
    }
}

fn count_for(table: &Table, team: &str) -> u32 {
    table
        .rows
        .iter()
        .filter(|row| row.get("team_number").map(|t| t.trim()) == Some(team))
        .count() as u32
}
