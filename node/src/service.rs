// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! The exposed anchoring operations.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use graintrust_kernel::readiness::{evaluate, ReadinessReport};
use graintrust_kernel::types::{AnchorReceipt, BatchSnapshot};
use graintrust_kernel::verify::{verify, VerificationOutcome};
use serde::Serialize;

use crate::assembly::{load_snapshot, validate_batch_id};
use crate::backend::{AnchorBackend, LedgerBackend, LedgerClient, SimulatedBackend};
use crate::certificate::Certificate;
use crate::config::NodeConfig;
use crate::errors::AnchorError;
use crate::store::{BatchRecord, BatchStore, SyncStatus};
use crate::sync::{SyncOrchestrator, SyncOutcome};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    #[serde(flatten)]
    pub outcome: VerificationOutcome,
    pub network: String,
    pub block_number: u64,
    pub explorer_url: String,
    pub verified_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReceiptEntry {
    #[serde(flatten)]
    pub receipt: AnchorReceipt,
    pub explorer_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchStatus {
    pub batch_id: String,
    pub status: SyncStatus,
    pub data_hash: Option<String>,
    pub transaction_hash: Option<String>,
    pub network: Option<String>,
    pub synced_at: Option<String>,
    pub explorer_url: Option<String>,
    /// Only reported while the batch is not synced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ReadinessReport>,
    /// Newest first.
    pub history: Vec<ReceiptEntry>,
}

pub struct AnchorService {
    config: NodeConfig,
    store: Arc<dyn BatchStore>,
    orchestrator: SyncOrchestrator,
}

impl AnchorService {
    pub fn new(config: NodeConfig, store: Arc<dyn BatchStore>) -> Self {
        let ledger = config.use_ledger_backend.then(|| {
            Arc::new(LedgerBackend::from_config(config.ledger.clone())) as Arc<dyn AnchorBackend>
        });
        Self::assemble(config, store, ledger)
    }

    /// Like [`AnchorService::new`] but drives the ledger through `client`.
    pub fn with_ledger_client(config: NodeConfig, store: Arc<dyn BatchStore>, client: Arc<dyn LedgerClient>) -> Self {
        let ledger = config.use_ledger_backend.then(|| {
            Arc::new(LedgerBackend::with_client(config.ledger.clone(), client)) as Arc<dyn AnchorBackend>
        });
        Self::assemble(config, store, ledger)
    }

    fn assemble(config: NodeConfig, store: Arc<dyn BatchStore>, ledger: Option<Arc<dyn AnchorBackend>>) -> Self {
        let simulated = Arc::new(SimulatedBackend::new(config.network_label.clone(), config.simulated_delay));
        let orchestrator = SyncOrchestrator::new(
            store.clone(),
            simulated,
            ledger,
            config.allow_fallback,
            config.readiness,
        );
        Self {
            config,
            store,
            orchestrator,
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub async fn check_readiness(&self, batch_id: &str) -> Result<ReadinessReport, AnchorError> {
        validate_batch_id(batch_id)?;
        let (_, snapshot) = load_snapshot(self.store.as_ref(), batch_id).await?;
        Ok(evaluate(&snapshot, &self.config.readiness))
    }

    /// Current snapshot of a batch, for offline re-verification.
    pub async fn snapshot(&self, batch_id: &str) -> Result<BatchSnapshot, AnchorError> {
        validate_batch_id(batch_id)?;
        let (_, snapshot) = load_snapshot(self.store.as_ref(), batch_id).await?;
        Ok(snapshot)
    }

    pub async fn sync(&self, batch_id: &str) -> Result<SyncOutcome, AnchorError> {
        self.orchestrator.sync(batch_id).await
    }

    /// Receipt the batch row currently points at.
    async fn anchored_receipt(&self, batch: &BatchRecord) -> Result<AnchorReceipt, AnchorError> {
        if batch.anchor.status != SyncStatus::Synced {
            return Err(AnchorError::NotSynced(batch.id.clone()));
        }
        let receipt = match &batch.anchor.transaction_hash {
            Some(tx) => self.store.find_receipt(&batch.id, tx).await?,
            None => self.store.latest_receipt(&batch.id).await?,
        };
        receipt.ok_or_else(|| AnchorError::ReceiptMissing(batch.id.clone()))
    }

    /// Recomputes the batch digests and compares them with its anchor. Read-only.
    pub async fn verify(&self, batch_id: &str) -> Result<VerificationReport, AnchorError> {
        validate_batch_id(batch_id)?;
        let (batch, snapshot) = load_snapshot(self.store.as_ref(), batch_id).await?;
        let receipt = self.anchored_receipt(&batch).await?;

        let outcome = verify(&snapshot, &receipt);
        let verified_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        if outcome.verified {
            metrics::counter!("graintrust_verify_total", 1, "result" => "verified");
            tracing::info!(
                "Verification of {} against tx {} passed at {}",
                batch_id,
                receipt.transaction_hash,
                verified_at
            );
        } else {
            metrics::counter!("graintrust_verify_total", 1, "result" => "mismatch");
            tracing::warn!(
                "Verification of {} against tx {} failed at {}: {:?}",
                batch_id,
                receipt.transaction_hash,
                verified_at,
                outcome.mismatch_details
            );
        }

        Ok(VerificationReport {
            outcome,
            explorer_url: self.config.explorer_tx_url(&receipt.transaction_hash),
            network: receipt.network,
            block_number: receipt.block_number,
            verified_at,
        })
    }

    pub async fn certificate(&self, batch_id: &str) -> Result<Certificate, AnchorError> {
        validate_batch_id(batch_id)?;
        let (batch, snapshot) = load_snapshot(self.store.as_ref(), batch_id).await?;
        let receipt = self.anchored_receipt(&batch).await?;
        Ok(Certificate::issue(&self.config, &batch, &snapshot, receipt, Utc::now()))
    }

    pub async fn status(&self, batch_id: &str) -> Result<BatchStatus, AnchorError> {
        validate_batch_id(batch_id)?;
        let (batch, snapshot) = load_snapshot(self.store.as_ref(), batch_id).await?;

        let readiness = (batch.anchor.status != SyncStatus::Synced)
            .then(|| evaluate(&snapshot, &self.config.readiness));
        let history = self
            .store
            .receipts(batch_id)
            .await?
            .into_iter()
            .map(|receipt| ReceiptEntry {
                explorer_url: self.config.explorer_tx_url(&receipt.transaction_hash),
                receipt,
            })
            .collect();

        let anchor = batch.anchor;
        Ok(BatchStatus {
            batch_id: batch.id,
            status: anchor.status,
            explorer_url: anchor.transaction_hash.as_deref().map(|tx| self.config.explorer_tx_url(tx)),
            data_hash: anchor.data_hash,
            transaction_hash: anchor.transaction_hash,
            network: anchor.network,
            synced_at: anchor.synced_at,
            readiness,
            history,
        })
    }

    /// Allows a synced batch to be anchored again. Earlier receipts stay in the chain.
    pub async fn reset(&self, batch_id: &str) -> Result<(), AnchorError> {
        validate_batch_id(batch_id)?;
        self.store.reset_anchor(batch_id).await?;
        tracing::info!("Anchor state of {} reset; batch may be synced again", batch_id);
        Ok(())
    }
}
