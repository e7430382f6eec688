//! API error types.

use crate::api::types::ErrorResponse;
use crate::error::{AdminError, StoreError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("CSV not found")]
    TableNotFound,

    #[error("Row index out of range")]
    RowOutOfRange,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::TableNotFound(_) => ApiError::TableNotFound,
            AdminError::NotAnObject => ApiError::BadRequest(AdminError::NotAnObject.to_string()),
            AdminError::Store(StoreError::OutOfRange { .. }) => ApiError::RowOutOfRange,
            AdminError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("Worker task failed: {err}"))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::TableNotFound => StatusCode::NOT_FOUND,
            ApiError::RowOutOfRange | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_error_mapping() {
        let err: ApiError = AdminError::TableNotFound("x".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "CSV not found");

        let err: ApiError = AdminError::Store(StoreError::OutOfRange { index: 9, len: 1 }).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Row index out of range");

        let err: ApiError = AdminError::Store(StoreError::InvalidValue {
            column: "attempts".into(),
            value: "x".into(),
        })
        .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
