// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Record store contract.
//!
//! The store owns batch, stage, verification and anchor rows. The anchoring core only
//! reads them and hands finished receipts back through [`BatchStore::commit_anchor`].

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use graintrust_kernel::types::{AnchorReceipt, Verdict};
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

pub use memory::MemoryStore;

/// Persisted anchoring state of a batch. `SYNCING` only exists inside one sync call
/// and is never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    #[default]
    NotSynced,
    Synced,
}

/// Anchor columns on the batch row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorState {
    pub status: SyncStatus,
    pub data_hash: Option<String>,
    pub transaction_hash: Option<String>,
    pub network: Option<String>,
    pub synced_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub id: String,
    pub batch_code: String,
    pub farmer_id: String,
    pub farmer_name: String,
    pub crop_type: String,
    pub quantity: f64,
    pub location: String,
    pub harvest_date: NaiveDate,
    #[serde(default)]
    pub anchor: AnchorState,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    /// SHA-256 of the uploaded bytes.
    pub content_hash: String,
    /// Salted display tag assigned at upload. Not an integrity input.
    #[serde(default)]
    pub audit_hash: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub id: String,
    pub batch_id: String,
    pub name: String,
    pub order: u32,
    /// `None` while the stage is still in progress.
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVerificationRecord {
    pub batch_id: String,
    pub stage_id: String,
    pub image_url: String,
    pub verdict: Verdict,
    pub reviewed_at: DateTime<Utc>,
}

/// Result of the conditional NOT_SYNCED -> SYNCED transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// Another caller won the transition; carries the receipt it stored.
    AlreadySynced(Option<AnchorReceipt>),
}

#[async_trait]
pub trait BatchStore: Send + Sync {
    async fn load_batch(&self, batch_id: &str) -> Result<Option<BatchRecord>, StoreError>;

    /// Stages of a batch ordered by `order`.
    async fn load_stages(&self, batch_id: &str) -> Result<Vec<StageRecord>, StoreError>;

    async fn load_verifications(&self, batch_id: &str) -> Result<Vec<ImageVerificationRecord>, StoreError>;

    /// Most recently created receipt of a batch.
    async fn latest_receipt(&self, batch_id: &str) -> Result<Option<AnchorReceipt>, StoreError>;

    /// All receipts of a batch, newest first.
    async fn receipts(&self, batch_id: &str) -> Result<Vec<AnchorReceipt>, StoreError>;

    async fn find_receipt(&self, batch_id: &str, transaction_hash: &str) -> Result<Option<AnchorReceipt>, StoreError>;

    /// Atomically: if the batch is NOT_SYNCED, append `receipt`, mark the batch SYNCED
    /// and copy the receipt's hashes onto the batch row. Otherwise change nothing.
    async fn commit_anchor(&self, receipt: &AnchorReceipt) -> Result<CommitOutcome, StoreError>;

    /// Administrative SYNCED -> NOT_SYNCED reset so a batch can be anchored again.
    /// The receipt chain is kept.
    async fn reset_anchor(&self, batch_id: &str) -> Result<(), StoreError>;
}
