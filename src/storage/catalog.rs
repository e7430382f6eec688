//! The fixed set of tables backing the gate.

use crate::error::StoreResult;
use crate::storage::migrations;
use crate::storage::row_store::RowStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

pub const CREDENTIAL_COLUMNS: &[&str] = &["team_number", "passcode"];
pub const ATTEMPT_COLUMNS: &[&str] = &["team_number", "attempts"];
pub const FIRST_STAGE_ENTRY_COLUMNS: &[&str] = &["team_number", "timestamp"];
pub const SECOND_STAGE_ENTRY_COLUMNS: &[&str] = &["team_number", "timestamp", "attempts", "entry_number"];

/// Demo credentials written when the stage-one file does not exist yet.
pub const FIRST_STAGE_SEED: &[&[&str]] = &[
    &["001", "alpha123"],
    &["002", "beta456"],
    &["003", "gamma789"],
];

/// Demo credentials written when the stage-two file does not exist yet.
pub const SECOND_STAGE_SEED: &[&[&str]] = &[
    &["001", "delta321"],
    &["002", "epsilon654"],
    &["003", "zeta987"],
];

pub const ATTEMPTS_FILE: &str = "attempts_tracking.csv";

/// Tables reachable through the administrative surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableId {
    FirstStageCredentials,
    SecondStageCredentials,
    FirstStageEntries,
    SecondStageEntries,
}

impl TableId {
    pub const ALL: [TableId; 4] = [
        TableId::FirstStageCredentials,
        TableId::SecondStageCredentials,
        TableId::FirstStageEntries,
        TableId::SecondStageEntries,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            TableId::FirstStageCredentials => "first-stage-credentials",
            TableId::SecondStageCredentials => "second-stage-credentials",
            TableId::FirstStageEntries => "first-stage-entries",
            TableId::SecondStageEntries => "second-stage-entries",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TableId::FirstStageCredentials => "First Stage Credentials",
            TableId::SecondStageCredentials => "Second Stage Credentials",
            TableId::FirstStageEntries => "First Stage Entries",
            TableId::SecondStageEntries => "Second Stage Entries",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            TableId::FirstStageCredentials => "csv1.csv",
            TableId::SecondStageCredentials => "csv2.csv",
            TableId::FirstStageEntries => "csv3.csv",
            TableId::SecondStageEntries => "csv4.csv",
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            TableId::FirstStageCredentials | TableId::SecondStageCredentials => CREDENTIAL_COLUMNS,
            TableId::FirstStageEntries => FIRST_STAGE_ENTRY_COLUMNS,
            TableId::SecondStageEntries => SECOND_STAGE_ENTRY_COLUMNS,
        }
    }

    pub fn seed(self) -> &'static [&'static [&'static str]] {
        match self {
            TableId::FirstStageCredentials => FIRST_STAGE_SEED,
            TableId::SecondStageCredentials => SECOND_STAGE_SEED,
            TableId::FirstStageEntries | TableId::SecondStageEntries => &[],
        }
    }

    /// Entry tables get a `timestamp` stamped on insert when none is supplied.
    pub fn is_entry_log(self) -> bool {
        matches!(
            self,
            TableId::FirstStageEntries | TableId::SecondStageEntries
        )
    }
}

impl FromStr for TableId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableId::ALL
            .into_iter()
            .find(|id| id.slug() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Every table the gate owns, opened under one data directory.
pub struct Tables {
    data_dir: PathBuf,
    first_stage_credentials: RowStore,
    second_stage_credentials: RowStore,
    first_stage_entries: RowStore,
    second_stage_entries: RowStore,
    attempts: RowStore,
}

impl Tables {
    /// Open (and seed where missing) all tables under `data_dir`, then bring
    /// older stage-two entry files up to the current schema.
    pub fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| crate::error::StoreError::io(&data_dir, e))?;

        let second_stage_entries_path = data_dir.join(TableId::SecondStageEntries.file_name());
        let migrate = second_stage_entries_path.exists();

        let open = |id: TableId| RowStore::open(data_dir.join(id.file_name()), id.columns(), id.seed());
        let tables = Self {
            first_stage_credentials: open(TableId::FirstStageCredentials)?,
            second_stage_credentials: open(TableId::SecondStageCredentials)?,
            first_stage_entries: open(TableId::FirstStageEntries)?,
            second_stage_entries: open(TableId::SecondStageEntries)?,
            attempts: RowStore::open(data_dir.join(ATTEMPTS_FILE), ATTEMPT_COLUMNS, &[])?,
            data_dir,
        };

        if migrate {
            // keep serving so the table can be repaired through the admin routes
            if let Err(e) = migrations::upgrade_second_stage_entries(&tables.second_stage_entries) {
                warn!("Skipping second-stage entries upgrade: {}", e);
            }
        }

        info!("Tables ready in {:?}", tables.data_dir);
        Ok(tables)
    }

    pub fn get(&self, id: TableId) -> &RowStore {
        match id {
            TableId::FirstStageCredentials => &self.first_stage_credentials,
            TableId::SecondStageCredentials => &self.second_stage_credentials,
            TableId::FirstStageEntries => &self.first_stage_entries,
            TableId::SecondStageEntries => &self.second_stage_entries,
        }
    }

    /// The attempt table is internal and never exposed through [`TableId`].
    pub fn attempts(&self) -> &RowStore {
        &self.attempts
    }
}
