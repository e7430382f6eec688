//! Stage Gate
//!
//! Two-stage team credential verification backed by flat CSV tables.
//! Stage one checks a team's passcode and logs the entry. Stage two does the
//! same while counting every attempt per team, recording the count on success
//! and resetting it afterwards.
//!
//! ## Module Structure
//!
//! - `storage/`: CSV codec, locked row stores, table catalog, migrations
//! - `credentials`: passcode lookup and match strategies
//! - `attempts`: stage-two attempt counter
//! - `entries`: success log
//! - `verification`: the stage one / stage two flows
//! - `admin`: CRUD over the tables by row index
//! - `api/`: REST handlers
//! - `server`: router and startup

/// Shared utility functions
pub mod util;

/// Error types
pub mod error;

/// Data persistence layer
pub mod storage;

pub mod attempts;
pub mod config;
pub mod credentials;
pub mod entries;
pub mod verification;

/// Table administration
pub mod admin;

/// REST API
pub mod api;

/// HTTP server
pub mod server;

pub use admin::{AdminService, TableInfo};
pub use attempts::AttemptTracker;
pub use config::GateConfig;
pub use credentials::{CredentialTable, MatchStrategy};
pub use entries::{EntryLog, EntryRecord};
pub use error::{AdminError, StoreError};
pub use server::{build_router, run_server};
pub use storage::{Row, RowStore, Table, TableId, Tables};
pub use verification::{Stage, VerificationService, VerifyOutcome};
