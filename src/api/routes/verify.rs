//! Verification endpoints.
//!
//! Business rejections ("Invalid credentials", "Configuration error") are
//! normal 200 responses with `success: false`. Only storage faults produce a
//! 500, carrying the fault text in `error`.

use crate::api::state::ApiState;
use crate::api::types::{VerifyRequest, VerifyResponse};
use crate::verification::Stage;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;

/// POST /api/verify-first-stage
pub async fn verify_first_stage(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<VerifyRequest>,
) -> impl IntoResponse {
    run(state, Stage::First, req).await
}

/// POST /api/verify-second-stage
pub async fn verify_second_stage(
    State(state): State<Arc<ApiState>>,
    Json(req): Json<VerifyRequest>,
) -> impl IntoResponse {
    run(state, Stage::Second, req).await
}

async fn run(
    state: Arc<ApiState>,
    stage: Stage,
    req: VerifyRequest,
) -> (StatusCode, Json<VerifyResponse>) {
    let team = req.team_number();
    let passcode = req.passcode();
    let service = state.verification.clone();

    let result =
        tokio::task::spawn_blocking(move || service.verify(stage, &team, &passcode)).await;

    match result {
        Ok(Ok(outcome)) => (StatusCode::OK, Json(VerifyResponse::from(&outcome))),
        Ok(Err(e)) => {
            error!("{} verification failed: {}", stage, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VerifyResponse::fault(e.to_string())),
            )
        }
        Err(e) => {
            error!("{} verification task failed: {}", stage, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VerifyResponse::fault(e.to_string())),
            )
        }
    }
}
