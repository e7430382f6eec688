//! API route handlers.
//!
//! Each submodule handles a specific group of endpoints:
//! - `verify`: stage one / stage two credential checks
//! - `tables`: administrative CRUD over the csv tables

pub mod tables;
pub mod verify;

use axum::{response::IntoResponse, Json};

pub use tables::{add_row, delete_row, get_rows, get_schema, list_tables, update_row};
pub use verify::{verify_first_stage, verify_second_stage};

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
