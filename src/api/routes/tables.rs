//! Table administration endpoints.
//!
//! Thin wrappers over [`AdminService`]. Every call runs on the blocking pool.

use crate::admin::AdminService;
use crate::api::errors::ApiError;
use crate::api::state::ApiState;
use crate::api::types::{RowsMutationResponse, RowsResponse, SchemaResponse, TableListResponse};
use axum::extract::{Json, Path, State};
use serde_json::Value;
use std::sync::Arc;

async fn blocking<T, F>(state: &ApiState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&AdminService) -> Result<T, ApiError> + Send + 'static,
{
    let admin = state.admin.clone();
    tokio::task::spawn_blocking(move || f(admin.as_ref())).await?
}

/// GET /api/csv-files
pub async fn list_tables(State(state): State<Arc<ApiState>>) -> Json<TableListResponse> {
    Json(TableListResponse {
        files: state.admin.list_tables(),
    })
}

/// GET /api/csv/:csv_id
pub async fn get_rows(
    State(state): State<Arc<ApiState>>,
    Path(csv_id): Path<String>,
) -> Result<Json<RowsResponse>, ApiError> {
    let data = blocking(&state, move |admin| Ok(admin.rows(&csv_id)?)).await?;
    Ok(Json(RowsResponse { data }))
}

/// POST /api/csv/:csv_id
pub async fn add_row(
    State(state): State<Arc<ApiState>>,
    Path(csv_id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<RowsMutationResponse>, ApiError> {
    let data = blocking(&state, move |admin| Ok(admin.insert(&csv_id, &payload)?)).await?;
    Ok(Json(RowsMutationResponse {
        success: true,
        data,
    }))
}

/// PUT /api/csv/:csv_id/:row_index
pub async fn update_row(
    State(state): State<Arc<ApiState>>,
    Path((csv_id, row_index)): Path<(String, i64)>,
    Json(payload): Json<Value>,
) -> Result<Json<RowsMutationResponse>, ApiError> {
    let data = blocking(&state, move |admin| {
        Ok(admin.update(&csv_id, row_index, &payload)?)
    })
    .await?;
    Ok(Json(RowsMutationResponse {
        success: true,
        data,
    }))
}

/// DELETE /api/csv/:csv_id/:row_index
pub async fn delete_row(
    State(state): State<Arc<ApiState>>,
    Path((csv_id, row_index)): Path<(String, i64)>,
) -> Result<Json<RowsMutationResponse>, ApiError> {
    let data = blocking(&state, move |admin| Ok(admin.delete(&csv_id, row_index)?)).await?;
    Ok(Json(RowsMutationResponse {
        success: true,
        data,
    }))
}

/// GET /api/csv/:csv_id/schema
pub async fn get_schema(
    State(state): State<Arc<ApiState>>,
    Path(csv_id): Path<String>,
) -> Result<Json<SchemaResponse>, ApiError> {
    let columns = blocking(&state, move |admin| Ok(admin.schema(&csv_id)?)).await?;
    Ok(Json(SchemaResponse { columns }))
}
