//! Gate HTTP Server
//!
//! ```text
//! POST   /api/verify-first-stage        stage one check
//! POST   /api/verify-second-stage       stage two check (+ attempt tracking)
//! GET    /api/csv-files                 list administrable tables
//! GET    /api/csv/:csv_id               all rows
//! POST   /api/csv/:csv_id               append a row
//! PUT    /api/csv/:csv_id/:row_index    update a row
//! DELETE /api/csv/:csv_id/:row_index    delete a row
//! GET    /api/csv/:csv_id/schema        column names
//! GET    /health
//! ```

use crate::api::routes::{
    add_row, delete_row, get_rows, get_schema, health_check, list_tables, update_row,
    verify_first_stage, verify_second_stage,
};
use crate::api::ApiState;
use crate::config::GateConfig;
use crate::storage::Tables;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

// ============================================================================
// ROUTER
// ============================================================================

pub fn build_router(state: Arc<ApiState>, cors: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/verify-first-stage", post(verify_first_stage))
        .route("/api/verify-second-stage", post(verify_second_stage))
        .route("/api/csv-files", get(list_tables))
        .route("/api/csv/:csv_id", get(get_rows).post(add_row))
        .route("/api/csv/:csv_id/schema", get(get_schema))
        .route("/api/csv/:csv_id/:row_index", put(update_row).delete(delete_row))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

// ============================================================================
// SERVER STARTUP
// ============================================================================

pub async fn run_server(config: GateConfig) -> anyhow::Result<()> {
    let data_dir = config.data_dir.clone();
    let tables = tokio::task::spawn_blocking(move || Tables::open(data_dir)).await??;
    let state = Arc::new(ApiState::new(Arc::new(tables), config.match_strategy));
    let app = build_router(state, config.cors);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Stage gate listening on {}", addr);
    info!("  Data dir: {:?}", config.data_dir);
    info!("  Match strategy: {:?}", config.match_strategy);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
