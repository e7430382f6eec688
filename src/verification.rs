//! Team credential verification for both stages.
//!
//! Flow per request:
//! 1. Trim the team number and passcode (both stay strings, so `"001"` keeps its zeros)
//! 2. Stage two only: count the attempt, before anything else can fail
//! 3. Look up the expected passcode using the configured [`MatchStrategy`]
//! 4. On an exact match, append an entry; stage two then zeroes the attempt counter
//!
//! Each stage runs the whole sequence under its own lock, so concurrent
//! requests cannot interleave between the counter update and the entry append.

use crate::attempts::AttemptTracker;
use crate::credentials::{CredentialTable, MatchStrategy};
use crate::entries::{EntryLog, EntryRecord};
use crate::error::StoreResult;
use crate::storage::{TableId, Tables};
use crate::util::timestamp;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const CONFIGURATION_ERROR: &str = "Configuration error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    First,
    Second,
}

impl Stage {
    fn credentials(self) -> TableId {
        match self {
            Stage::First => TableId::FirstStageCredentials,
            Stage::Second => TableId::SecondStageCredentials,
        }
    }

    fn entries(self) -> TableId {
        match self {
            Stage::First => TableId::FirstStageEntries,
            Stage::Second => TableId::SecondStageEntries,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::First => f.write_str("first-stage"),
            Stage::Second => f.write_str("second-stage"),
        }
    }
}

/// Business result of one verification call. Storage faults are reported
/// separately as `Err(StoreError)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Accepted(EntryRecord),
    /// The team has a credential row but the passcode differs.
    InvalidCredentials,
    /// No credential row exists for the team.
    ConfigurationError,
}

impl VerifyOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, VerifyOutcome::Accepted(_))
    }

    /// Client-facing message for a rejection.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            VerifyOutcome::Accepted(_) => None,
            VerifyOutcome::InvalidCredentials => Some(INVALID_CREDENTIALS),
            VerifyOutcome::ConfigurationError => Some(CONFIGURATION_ERROR),
        }
    }
}

pub struct VerificationService {
    tables: Arc<Tables>,
    strategy: MatchStrategy,
    first_stage: Mutex<()>,
    second_stage: Mutex<()>,
}

impl VerificationService {
    pub fn new(tables: Arc<Tables>, strategy: MatchStrategy) -> Self {
        Self {
            tables,
            strategy,
            first_stage: Mutex::new(()),
            second_stage: Mutex::new(()),
        }
    }

    pub fn attempts(&self) -> AttemptTracker<'_> {
        AttemptTracker::new(self.tables.attempts())
    }

    pub fn entry_log(&self, stage: Stage) -> EntryLog<'_> {
        EntryLog::new(self.tables.get(stage.entries()))
    }

    pub fn verify(&self, stage: Stage, team: &str, passcode: &str) -> StoreResult<VerifyOutcome> {
        match stage {
            Stage::First => self.verify_first_stage(team, passcode),
            Stage::Second => self.verify_second_stage(team, passcode),
        }
    }

    pub fn verify_first_stage(&self, team: &str, passcode: &str) -> StoreResult<VerifyOutcome> {
        let _guard = self.first_stage.lock();
        let (team, passcode) = (team.trim(), passcode.trim());
        debug!("{} verification for team {}", Stage::First, team);

        let outcome = match self.check(Stage::First, team, passcode)? {
            Some(outcome) => outcome,
            None => {
                let record = self
                    .entry_log(Stage::First)
                    .append(team, &timestamp::now_formatted(), None)?;
                VerifyOutcome::Accepted(record)
            }
        };

        log_outcome(Stage::First, team, &outcome);
        Ok(outcome)
    }

    pub fn verify_second_stage(&self, team: &str, passcode: &str) -> StoreResult<VerifyOutcome> {
        let _guard = self.second_stage.lock();
        let (team, passcode) = (team.trim(), passcode.trim());

        let tracker = self.attempts();
        let current_attempts = tracker.record_attempt(team)?;
        debug!(
            "{} verification for team {} (attempt {})",
            Stage::Second,
            team,
            current_attempts
        );

        let outcome = match self.check(Stage::Second, team, passcode)? {
            Some(outcome) => outcome,
            None => {
                let record = self.entry_log(Stage::Second).append(
                    team,
                    &timestamp::now_formatted(),
                    Some(current_attempts),
                )?;
                tracker.reset(team)?;
                VerifyOutcome::Accepted(record)
            }
        };

        log_outcome(Stage::Second, team, &outcome);
        Ok(outcome)
    }

    /// `None` when the passcode matches, otherwise the rejection.
    fn check(&self, stage: Stage, team: &str, passcode: &str) -> StoreResult<Option<VerifyOutcome>> {
        let credentials = CredentialTable::new(self.tables.get(stage.credentials()), self.strategy);
        Ok(match credentials.lookup(team)? {
            Some(expected) if expected == passcode => None,
            Some(_) => Some(VerifyOutcome::InvalidCredentials),
            None => Some(VerifyOutcome::ConfigurationError),
        })
    }
}

fn log_outcome(stage: Stage, team: &str, outcome: &VerifyOutcome) {
    match outcome {
        VerifyOutcome::Accepted(record) => info!(
            "{} accepted team {} at {}{}",
            stage,
            team,
            record.timestamp,
            record
                .entry_number
                .map(|n| format!(" (entry #{n})"))
                .unwrap_or_default()
        ),
        VerifyOutcome::InvalidCredentials => {
            warn!("{} rejected team {}: passcode mismatch", stage, team)
        }
        VerifyOutcome::ConfigurationError => {
            warn!("{} rejected team {}: no credential row", stage, team)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, Timelike};
    use tempfile::tempdir;

    fn service(dir: &std::path::Path) -> VerificationService {
        let tables = Arc::new(Tables::open(dir).unwrap());
        VerificationService::new(tables, MatchStrategy::Direct)
    }

    #[test]
    fn test_first_stage_accepts_seeded_teams() {
        let dir = tempdir().unwrap();
        let svc = service(dir.path());
        let before = Local::now().naive_local().with_nanosecond(0).unwrap();

        for (team, pass) in [("001", "alpha123"), ("002", "beta456"), ("003", "gamma789")] {
            let outcome = svc.verify_first_stage(team, pass).unwrap();
            assert!(outcome.is_accepted(), "{team} should be accepted");
        }

        let entries = svc.entry_log(Stage::First).entries().unwrap();
        assert_eq!(entries.len(), 3);
        for entry in &entries {
            let at = timestamp::parse(&entry.timestamp).unwrap();
            assert!(at >= before);
            assert_eq!(entry.attempts, None);
        }
    }

    #[test]
    fn test_first_stage_trims_inputs() {
        let dir = tempdir().unwrap();
        let svc = service(dir.path());

        let outcome = svc.verify_first_stage("  001 ", " alpha123\n").unwrap();
        match outcome {
            VerifyOutcome::Accepted(record) => assert_eq!(record.team_number, "001"),
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_first_stage_rejections_append_nothing() {
        let dir = tempdir().unwrap();
        let svc = service(dir.path());

        assert_eq!(
            svc.verify_first_stage("001", "ALPHA123").unwrap(),
            VerifyOutcome::InvalidCredentials
        );
        assert_eq!(
            svc.verify_first_stage("1", "alpha123").unwrap(),
            VerifyOutcome::ConfigurationError
        );
        assert!(svc.entry_log(Stage::First).entries().unwrap().is_empty());
        // stage one never touches the attempt table
        assert!(svc.tables.attempts().load().unwrap().is_empty());
    }

    #[test]
    fn test_second_stage_counts_until_success() {
        let dir = tempdir().unwrap();
        let svc = service(dir.path());

        for n in 1..=3 {
            assert_eq!(
                svc.verify_second_stage("002", "nope").unwrap(),
                VerifyOutcome::InvalidCredentials
            );
            assert_eq!(svc.attempts().attempts("002").unwrap(), Some(n));
        }

        let outcome = svc.verify_second_stage("002", "epsilon654").unwrap();
        let VerifyOutcome::Accepted(record) = outcome else {
            panic!("expected acceptance");
        };
        assert_eq!(record.attempts, Some(4));
        assert_eq!(record.entry_number, Some(1));
        assert_eq!(svc.attempts().attempts("002").unwrap(), Some(0));

        svc.verify_second_stage("002", "nope").unwrap();
        assert_eq!(svc.attempts().attempts("002").unwrap(), Some(1));
    }

    #[test]
    fn test_second_stage_unknown_team_still_counts() {
        let dir = tempdir().unwrap();
        let svc = service(dir.path());

        assert_eq!(
            svc.verify_second_stage("777", "delta321").unwrap(),
            VerifyOutcome::ConfigurationError
        );
        assert_eq!(svc.attempts().attempts("777").unwrap(), Some(1));
        assert!(svc.entry_log(Stage::Second).entries().unwrap().is_empty());
    }

    #[test]
    fn test_entry_number_ignores_other_teams() {
        let dir = tempdir().unwrap();
        let svc = service(dir.path());

        let run = |team: &str, pass: &str| match svc.verify_second_stage(team, pass).unwrap() {
            VerifyOutcome::Accepted(r) => r.entry_number,
            other => panic!("expected acceptance, got {:?}", other),
        };

        assert_eq!(run("001", "delta321"), Some(1));
        assert_eq!(run("003", "zeta987"), Some(1));
        assert_eq!(run("003", "zeta987"), Some(2));
        assert_eq!(run("001", "delta321"), Some(2));
        assert_eq!(run("001", "delta321"), Some(3));
    }

    #[test]
    fn test_parity_strategy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(TableId::FirstStageCredentials.file_name());
        std::fs::write(&path, "team_number,passcode\n1,odd-code\n2,even-code\n").unwrap();
        let tables = Arc::new(Tables::open(dir.path()).unwrap());
        let svc = VerificationService::new(tables, MatchStrategy::ParityBucket);

        assert!(svc.verify_first_stage("15", "odd-code").unwrap().is_accepted());
        assert_eq!(
            svc.verify_first_stage("15", "even-code").unwrap(),
            VerifyOutcome::InvalidCredentials
        );
        let VerifyOutcome::Accepted(record) = svc.verify_first_stage("8", "even-code").unwrap() else {
            panic!("expected acceptance");
        };
        // the entry records the requesting team, not the bucket row
        assert_eq!(record.team_number, "8");
    }

    #[test]
    fn test_parity_strategy_with_seeded_tables() {
        let dir = tempdir().unwrap();
        let tables = Arc::new(Tables::open(dir.path()).unwrap());
        let svc = VerificationService::new(tables, MatchStrategy::ParityBucket);

        assert!(svc.verify_first_stage("5", "alpha123").unwrap().is_accepted());
        assert!(svc.verify_first_stage("12", "beta456").unwrap().is_accepted());
        assert_eq!(
            svc.verify_first_stage("5", "gamma789").unwrap(),
            VerifyOutcome::InvalidCredentials
        );

        let VerifyOutcome::Accepted(record) = svc.verify_second_stage("4", "epsilon654").unwrap()
        else {
            panic!("expected acceptance");
        };
        assert_eq!(record.team_number, "4");
        assert_eq!(record.attempts, Some(1));
    }

    #[test]
    fn test_concurrent_second_stage_calls_lose_no_attempts() {
        let dir = tempdir().unwrap();
        let svc = Arc::new(service(dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let svc = svc.clone();
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        svc.verify_second_stage("003", "wrong").unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(svc.attempts().attempts("003").unwrap(), Some(40));
    }

    #[test]
    fn test_malformed_credentials_surface_as_fault() {
        let dir = tempdir().unwrap();
        let svc = service(dir.path());
        std::fs::write(
            dir.path().join(TableId::FirstStageCredentials.file_name()),
            "team_number,passcode\n\"001,alpha123\n",
        )
        .unwrap();

        assert!(svc.verify_first_stage("001", "alpha123").is_err());
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            VerifyOutcome::InvalidCredentials.message(),
            Some("Invalid credentials")
        );
        assert_eq!(
            VerifyOutcome::ConfigurationError.message(),
            Some("Configuration error")
        );
    }
}
