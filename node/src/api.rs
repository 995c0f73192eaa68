// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use serde::{Deserialize, Serialize};

use crate::sync::SyncOutcome;

#[derive(Serialize)]
pub struct SyncResponse {
    #[serde(flatten)]
    pub outcome: SyncOutcome,
    pub explorer_url: String,
}

#[derive(Serialize, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
    pub batch_id: String,
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Backend tried first on sync.
    pub backend: String,
    pub network: String,
}
