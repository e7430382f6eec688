//! Read-only credential lookup for a stage.

use crate::error::StoreResult;
use crate::storage::RowStore;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a requesting team number selects the credential row to compare against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// The row whose `team_number` equals the requesting team.
    #[default]
    Direct,
    /// Odd numeric teams check the row numbered 1, even ones the row
    /// numbered 2. Non-numeric team numbers fall back to row 1. Stored keys
    /// compare numerically, so `"001"` is row 1.
    ParityBucket,
}

impl MatchStrategy {
    /// Whether the stored `team_number` cell `stored` is the row to check for `team`.
    pub fn matches(self, team: &str, stored: &str) -> bool {
        match self {
            MatchStrategy::Direct => stored == team,
            MatchStrategy::ParityBucket => {
                let bucket = parity_bucket(team);
                match stored.parse::<i64>() {
                    Ok(n) => n == bucket,
                    Err(_) => stored == bucket.to_string(),
                }
            }
        }
    }
}

fn parity_bucket(team: &str) -> i64 {
    match team.parse::<i64>() {
        Ok(n) if n.rem_euclid(2) == 0 => 2,
        _ => 1,
    }
}

impl FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "direct" => Ok(MatchStrategy::Direct),
            "parity_bucket" | "parity" => Ok(MatchStrategy::ParityBucket),
            other => Err(format!(
                "unknown match strategy '{other}' (expected 'direct' or 'parity-bucket')"
            )),
        }
    }
}

/// A stage's `team_number -> passcode` table.
pub struct CredentialTable<'a> {
    store: &'a RowStore,
    strategy: MatchStrategy,
}

impl<'a> CredentialTable<'a> {
    pub fn new(store: &'a RowStore, strategy: MatchStrategy) -> Self {
        Self { store, strategy }
    }

    /// Expected passcode for `team`, or `None` if no row matches.
    /// Stored cells are trimmed before comparison; the first matching row wins.
    pub fn lookup(&self, team: &str) -> StoreResult<Option<String>> {
        let table = self.store.load()?;

        Ok(table.rows.iter().find_map(|row| {
            let number = row.get("team_number").map(|v| v.trim())?;
            self.strategy.matches(team, number).then(|| {
                row.get("passcode")
                    .map(|p| p.trim().to_string())
                    .unwrap_or_default()
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &std::path::Path, rows: &[&[&str]]) -> RowStore {
        RowStore::open(dir.join("creds.csv"), &["team_number", "passcode"], rows).unwrap()
    }

    #[test]
    fn test_direct_lookup() {
        let dir = tempdir().unwrap();
        let store = store(dir.path(), &[&["001", "alpha123"], &["002", "beta456"]]);
        let creds = CredentialTable::new(&store, MatchStrategy::Direct);

        assert_eq!(creds.lookup("002").unwrap().as_deref(), Some("beta456"));
        assert_eq!(creds.lookup("2").unwrap(), None);
        assert_eq!(creds.lookup("999").unwrap(), None);
    }

    #[test]
    fn test_stored_values_are_trimmed() {
        let dir = tempdir().unwrap();
        let store = store(dir.path(), &[&[" 001 ", " alpha123 "]]);
        let creds = CredentialTable::new(&store, MatchStrategy::Direct);

        assert_eq!(creds.lookup("001").unwrap().as_deref(), Some("alpha123"));
    }

    #[test]
    fn test_parity_bucket_matching() {
        let s = MatchStrategy::ParityBucket;
        assert!(s.matches("7", "1"));
        assert!(s.matches("7", "001"));
        assert!(s.matches("010", "2"));
        assert!(s.matches("010", "002"));
        assert!(!s.matches("010", "001"));
        assert!(s.matches("-3", "1"));
        assert!(s.matches("team-x", "001"));
        assert!(!s.matches("7", "003"));
    }

    #[test]
    fn test_direct_keeps_leading_zeros() {
        let s = MatchStrategy::Direct;
        assert!(s.matches("001", "001"));
        assert!(!s.matches("1", "001"));
    }

    #[test]
    fn test_parity_bucket_lookup_zero_padded() {
        let dir = tempdir().unwrap();
        let store = store(
            dir.path(),
            &[&["001", "alpha123"], &["002", "beta456"], &["003", "gamma789"]],
        );
        let creds = CredentialTable::new(&store, MatchStrategy::ParityBucket);

        assert_eq!(creds.lookup("5").unwrap().as_deref(), Some("alpha123"));
        assert_eq!(creds.lookup("4").unwrap().as_deref(), Some("beta456"));
        assert_eq!(creds.lookup("003").unwrap().as_deref(), Some("alpha123"));
    }

    #[test]
    fn test_parity_bucket_lookup() {
        let dir = tempdir().unwrap();
        let store = store(dir.path(), &[&["1", "odd-pass"], &["2", "even-pass"]]);
        let creds = CredentialTable::new(&store, MatchStrategy::ParityBucket);

        assert_eq!(creds.lookup("13").unwrap().as_deref(), Some("odd-pass"));
        assert_eq!(creds.lookup("44").unwrap().as_deref(), Some("even-pass"));
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("direct".parse::<MatchStrategy>().unwrap(), MatchStrategy::Direct);
        assert_eq!(
            "Parity-Bucket".parse::<MatchStrategy>().unwrap(),
            MatchStrategy::ParityBucket
        );
        assert!("random".parse::<MatchStrategy>().is_err());
    }
}
