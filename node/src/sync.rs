// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Sync orchestration: readiness, backend submission, chain linking and the anchor commit.
//!
//! At most one receipt is committed per NOT_SYNCED -> SYNCED transition. Callers in this
//! process are serialized by a per-batch lock; other processes are stopped by the store's
//! conditional commit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use graintrust_kernel::proof::compute_digest_pair;
use graintrust_kernel::readiness::{evaluate, ReadinessPolicy};
use graintrust_kernel::types::AnchorReceipt;
use serde::Serialize;

use crate::assembly::{snapshot_for, validate_batch_id};
use crate::backend::{AnchorBackend, BackendKind, SubmitRequest};
use crate::errors::AnchorError;
use crate::store::{BatchStore, CommitOutcome, SyncStatus};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub receipt: AnchorReceipt,
    /// Backend that produced the receipt. `None` when the batch was already synced.
    pub backend: Option<BackendKind>,
    /// Why the ledger was skipped in favour of the simulated backend.
    pub fallback: Option<String>,
    pub already_synced: bool,
}

impl SyncOutcome {
    fn existing(receipt: AnchorReceipt) -> Self {
        Self {
            receipt,
            backend: None,
            fallback: None,
            already_synced: true,
        }
    }
}

/// Handle on a per-batch lock. Dropping it, including when the sync future is cancelled,
/// removes the map entry once no other caller holds or waits on it.
struct BatchLock<'a> {
    owner: &'a SyncOrchestrator,
    batch_id: &'a str,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for BatchLock<'_> {
    fn drop(&mut self) {
        let mut locks = self.owner.locks.lock().unwrap_or_else(|e| e.into_inner());
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(self.batch_id);
        }
    }
}

pub struct SyncOrchestrator {
    store: Arc<dyn BatchStore>,
    simulated: Arc<dyn AnchorBackend>,
    /// Tried first when set.
    ledger: Option<Arc<dyn AnchorBackend>>,
    allow_fallback: bool,
    policy: ReadinessPolicy,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<dyn BatchStore>,
        simulated: Arc<dyn AnchorBackend>,
        ledger: Option<Arc<dyn AnchorBackend>>,
        allow_fallback: bool,
        policy: ReadinessPolicy,
    ) -> Self {
        Self {
            store,
            simulated,
            ledger,
            allow_fallback,
            policy,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn batch_lock<'a>(&'a self, batch_id: &'a str) -> BatchLock<'a> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        let lock = locks.entry(batch_id.to_string()).or_default().clone();
        BatchLock {
            owner: self,
            batch_id,
            lock,
        }
    }

    pub async fn sync(&self, batch_id: &str) -> Result<SyncOutcome, AnchorError> {
        validate_batch_id(batch_id)?;

        let entry = self.batch_lock(batch_id);
        let _guard = entry.lock.lock().await;
        self.sync_locked(batch_id).await
    }

    async fn sync_locked(&self, batch_id: &str) -> Result<SyncOutcome, AnchorError> {
        let batch = self
            .store
            .load_batch(batch_id)
            .await?
            .ok_or_else(|| AnchorError::NotFound(batch_id.to_string()))?;

        if batch.anchor.status == SyncStatus::Synced {
            let receipt = self.stored_receipt(batch_id, batch.anchor.transaction_hash.as_deref()).await?;
            tracing::info!("Batch {} already synced in tx {}", batch_id, receipt.transaction_hash);
            return Ok(SyncOutcome::existing(receipt));
        }

        let snapshot = snapshot_for(self.store.as_ref(), &batch).await?;
        let report = evaluate(&snapshot, &self.policy);
        if !report.ready {
            metrics::counter!("graintrust_sync_rejected_total", 1, "reason" => "not_ready");
            tracing::info!("Batch {} not ready: {:?}", batch_id, report.reasons);
            return Err(AnchorError::NotReady { reasons: report.reasons });
        }

        let previous_hash = self
            .store
            .latest_receipt(batch_id)
            .await?
            .map(|r| r.digests.data_hash);

        let request = SubmitRequest {
            batch_id: batch.id.clone(),
            batch_code: batch.batch_code.clone(),
            digests: compute_digest_pair(&snapshot),
            previous_hash,
        };

        let (receipt, backend, fallback) = self.submit(&request).await?;

        match self.store.commit_anchor(&receipt).await? {
            CommitOutcome::Committed => {
                metrics::counter!("graintrust_sync_total", 1, "backend" => backend.as_str());
                tracing::info!(
                    "Batch {} anchored on {} in tx {} (block {})",
                    batch_id,
                    receipt.network,
                    receipt.transaction_hash,
                    receipt.block_number
                );
                Ok(SyncOutcome {
                    receipt,
                    backend: Some(backend),
                    fallback,
                    already_synced: false,
                })
            }
            CommitOutcome::AlreadySynced(winner) => {
                tracing::warn!(
                    "Batch {} was synced concurrently; discarding tx {}",
                    batch_id,
                    receipt.transaction_hash
                );
                let winner = winner.ok_or_else(|| AnchorError::ReceiptMissing(batch_id.to_string()))?;
                Ok(SyncOutcome::existing(winner))
            }
        }
    }

    async fn stored_receipt(&self, batch_id: &str, transaction_hash: Option<&str>) -> Result<AnchorReceipt, AnchorError> {
        let receipt = match transaction_hash {
            Some(tx) => self.store.find_receipt(batch_id, tx).await?,
            None => self.store.latest_receipt(batch_id).await?,
        };
        receipt.ok_or_else(|| AnchorError::ReceiptMissing(batch_id.to_string()))
    }

    async fn submit(
        &self,
        request: &SubmitRequest,
    ) -> Result<(AnchorReceipt, BackendKind, Option<String>), AnchorError> {
        let Some(ledger) = &self.ledger else {
            let receipt = timed_submit(self.simulated.as_ref(), request).await?;
            return Ok((receipt, BackendKind::Simulated, None));
        };

        match timed_submit(ledger.as_ref(), request).await {
            Ok(receipt) => Ok((receipt, BackendKind::Ledger, None)),
            Err(e) if self.allow_fallback => {
                metrics::counter!("graintrust_sync_fallback_total", 1);
                tracing::warn!("Ledger submission for {} failed ({}); falling back to simulated", request.batch_id, e);
                let receipt = timed_submit(self.simulated.as_ref(), request).await?;
                Ok((receipt, BackendKind::Simulated, Some(e.to_string())))
            }
            Err(e) => {
                metrics::counter!("graintrust_sync_rejected_total", 1, "reason" => e.kind());
                tracing::error!("Ledger submission for {} failed: {}", request.batch_id, e);
                Err(AnchorError::Backend(e))
            }
        }
    }
}

async fn timed_submit(
    backend: &dyn AnchorBackend,
    request: &SubmitRequest,
) -> Result<AnchorReceipt, crate::errors::BackendError> {
    let start = Instant::now();
    let result = backend.submit(request).await;
    metrics::histogram!(
        "graintrust_backend_submit_seconds",
        start.elapsed().as_secs_f64(),
        "backend" => backend.kind().as_str()
    );
    result
}
