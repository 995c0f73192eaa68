// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use graintrust_kernel::error::KernelError;
use serde_json::json;
use thiserror::Error;

/// Failures of a single backend submission.
///
/// `Configuration` means the backend could not even be attempted. Every other variant
/// is a submission that was attempted and did not produce a confirmed transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Ledger backend misconfigured: {0} is not set")]
    Configuration(&'static str),
    #[error("Insufficient funds to pay for the ledger transaction")]
    InsufficientFunds,
    #[error("Batch already recorded on the ledger")]
    AlreadyRecorded,
    #[error("Ledger call timed out after {0:?}")]
    Timeout(Duration),
    #[error("Ledger rejected the transaction: {0}")]
    Rejected(String),
    #[error("Ledger transport error: {0}")]
    Transport(String),
}

impl BackendError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Configuration(_) => "configuration",
            BackendError::InsufficientFunds => "insufficient_funds",
            BackendError::AlreadyRecorded => "already_recorded",
            BackendError::Timeout(_) => "timeout",
            BackendError::Rejected(_) => "rejected",
            BackendError::Transport(_) => "transport",
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Batch {0} not found")]
    BatchNotFound(String),
    #[error("Stage {0} not found")]
    StageNotFound(String),
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AnchorError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Batch {0} not found")]
    NotFound(String),
    #[error("Batch not ready for anchoring")]
    NotReady { reasons: Vec<String> },
    #[error("Batch {0} has not been anchored yet")]
    NotSynced(String),
    #[error("Anchor record {0} is missing from the store")]
    ReceiptMissing(String),
    #[error("Anchoring failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<KernelError> for AnchorError {
    fn from(e: KernelError) -> Self {
        AnchorError::Validation(e.to_string())
    }
}

impl From<StoreError> for AnchorError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::BatchNotFound(id) => AnchorError::NotFound(id),
            other => AnchorError::Store(other),
        }
    }
}

impl IntoResponse for AnchorError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            AnchorError::Validation(_) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            AnchorError::NotFound(_) | AnchorError::ReceiptMissing(_) => {
                (StatusCode::NOT_FOUND, json!({ "error": message }))
            }
            AnchorError::NotReady { reasons } => (
                StatusCode::CONFLICT,
                json!({ "error": message, "reasons": reasons }),
            ),
            AnchorError::NotSynced(_) => (StatusCode::CONFLICT, json!({ "error": message })),
            AnchorError::Backend(e) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": message, "kind": e.kind() }),
            ),
            AnchorError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
