// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Anchoring backends.
//!
//! A backend turns a digest pair into an [`AnchorReceipt`]. Callers pick a backend by
//! [`BackendKind`], never by inspecting the concrete type.

pub mod ledger;
pub mod simulated;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use graintrust_kernel::types::{AnchorReceipt, DigestPair};
use serde::{Deserialize, Serialize};

use crate::errors::BackendError;

pub use ledger::{LedgerBackend, LedgerClient};
pub use simulated::SimulatedBackend;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Simulated,
    Ledger,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Simulated => "simulated",
            BackendKind::Ledger => "ledger",
        }
    }
}

/// What gets anchored for one batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitRequest {
    pub batch_id: String,
    pub batch_code: String,
    pub digests: DigestPair,
    /// `data_hash` of the batch's latest receipt, if any.
    pub previous_hash: Option<String>,
}

#[async_trait]
pub trait AnchorBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn submit(&self, request: &SubmitRequest) -> Result<AnchorReceipt, BackendError>;
}

/// RFC 3339 UTC with millisecond precision, the receipt timestamp format.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
