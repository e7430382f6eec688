//! API state and configuration.
//!
//! Contains the shared state used across all API endpoints.

use crate::admin::AdminService;
use crate::credentials::MatchStrategy;
use crate::storage::Tables;
use crate::verification::VerificationService;
use std::sync::Arc;

pub struct ApiState {
    pub verification: Arc<VerificationService>,
    pub admin: Arc<AdminService>,
}

impl ApiState {
    pub fn new(tables: Arc<Tables>, strategy: MatchStrategy) -> Self {
        Self {
            verification: Arc::new(VerificationService::new(tables.clone(), strategy)),
            admin: Arc::new(AdminService::new(tables)),
        }
    }
}
