// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::Arc;

use axum::extract::{Path, Request as AxumRequest, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::{from_fn_with_state, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use graintrust_kernel::readiness::ReadinessReport;
use graintrust_kernel::types::BatchSnapshot;
use tower_http::cors::CorsLayer;

use crate::api::*;
use crate::certificate::Certificate;
use crate::errors::AnchorError;
use crate::service::{AnchorService, BatchStatus, VerificationReport};

pub type SharedService = Arc<AnchorService>;

async fn auth_guard(
    State(token): State<Arc<String>>,
    req: AxumRequest,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|val| val.to_str().ok())
        .and_then(|val| val.strip_prefix("Bearer "));

    match provided {
        Some(provided) if provided == token.as_str() => Ok(next.run(req).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

pub fn build_router(service: SharedService, auth_token: Option<String>) -> Router {
    let mut app = Router::new()
        .route("/v1/batches/:id/readiness", get(readiness))
        .route("/v1/batches/:id/sync", post(sync))
        .route("/v1/batches/:id/verify", get(verify))
        .route("/v1/batches/:id/certificate", get(certificate))
        .route("/v1/batches/:id/status", get(status))
        .route("/v1/batches/:id/snapshot", get(snapshot))
        .route("/v1/batches/:id/reset", post(reset))
        .with_state(service.clone());

    if let Some(token) = auth_token {
        tracing::info!("Auth Enabled: Bearer token required");
        app = app.layer(from_fn_with_state(Arc::new(token), auth_guard));
    } else {
        tracing::warn!("Auth Disabled: No token configured");
    }

    // Probes stay reachable without a token.
    app.merge(
        Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics_handler))
            .with_state(service),
    )
    .layer(CorsLayer::permissive())
}

async fn readiness(
    State(service): State<SharedService>,
    Path(batch_id): Path<String>,
) -> Result<Json<ReadinessReport>, AnchorError> {
    Ok(Json(service.check_readiness(&batch_id).await?))
}

async fn sync(
    State(service): State<SharedService>,
    Path(batch_id): Path<String>,
) -> Result<Json<SyncResponse>, AnchorError> {
    let outcome = service.sync(&batch_id).await?;
    let explorer_url = service.config().explorer_tx_url(&outcome.receipt.transaction_hash);
    Ok(Json(SyncResponse { outcome, explorer_url }))
}

async fn verify(
    State(service): State<SharedService>,
    Path(batch_id): Path<String>,
) -> Result<Json<VerificationReport>, AnchorError> {
    Ok(Json(service.verify(&batch_id).await?))
}

async fn certificate(
    State(service): State<SharedService>,
    Path(batch_id): Path<String>,
) -> Result<Json<Certificate>, AnchorError> {
    Ok(Json(service.certificate(&batch_id).await?))
}

async fn status(
    State(service): State<SharedService>,
    Path(batch_id): Path<String>,
) -> Result<Json<BatchStatus>, AnchorError> {
    Ok(Json(service.status(&batch_id).await?))
}

async fn snapshot(
    State(service): State<SharedService>,
    Path(batch_id): Path<String>,
) -> Result<Json<BatchSnapshot>, AnchorError> {
    Ok(Json(service.snapshot(&batch_id).await?))
}

async fn reset(
    State(service): State<SharedService>,
    Path(batch_id): Path<String>,
) -> Result<Json<ResetResponse>, AnchorError> {
    service.reset(&batch_id).await?;
    Ok(Json(ResetResponse {
        success: true,
        batch_id,
    }))
}

async fn health(State(service): State<SharedService>) -> Json<HealthResponse> {
    let config = service.config();
    let (backend, network) = if config.use_ledger_backend {
        ("ledger", config.ledger.network.clone())
    } else {
        ("simulated", config.network_label.clone())
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        backend: backend.to_string(),
        network,
    })
}

async fn metrics_handler() -> String {
    crate::telemetry::get_metrics()
}
