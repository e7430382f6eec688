//! Startup schema upgrades for table files written by older deployments.

use crate::error::StoreResult;
use crate::storage::row_store::RowStore;
use std::collections::HashMap;
use tracing::info;

/// Older stage-two entry files only carried `team_number,timestamp`.
///
/// Missing `attempts` cells become `0`. Missing `entry_number` cells are
/// rebuilt as the running per-team count up to and including each row.
pub fn upgrade_second_stage_entries(store: &RowStore) -> StoreResult<bool> {
    let table = store.load()?;
    if table.has_column("attempts") && table.has_column("entry_number") {
        return Ok(false);
    }

    store.modify(|table| {
        table.add_column("attempts", |_, _| "0".to_string());

        let mut seen: HashMap<String, u64> = HashMap::new();
        table.add_column("entry_number", |_, row| {
            let team = row
                .get("team_number")
                .map(|t| t.trim().to_string())
                .unwrap_or_default();
            let count = seen.entry(team).or_insert(0);
            *count += 1;
            count.to_string()
        });
        Ok(())
    })?;

    info!("Upgraded {:?} with attempts/entry_number columns", store.path());
    Ok(true)
}
