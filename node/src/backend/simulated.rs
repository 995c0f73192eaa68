// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use graintrust_kernel::config::TX_HASH_PREFIX;
use graintrust_kernel::hash::digest_concat;
use graintrust_kernel::types::{AnchorReceipt, AnchorStatus};
use rand::Rng;

use super::{now_timestamp, AnchorBackend, BackendKind, SubmitRequest};
use crate::errors::BackendError;

const GAS_RANGE: std::ops::Range<u64> = 21_000..121_000;

/// Local stand-in for a ledger. Produces receipts with the same shape as real ones and
/// never fails.
#[derive(Debug)]
pub struct SimulatedBackend {
    network: String,
    delay: Duration,
    last_block: AtomicU64,
}

impl SimulatedBackend {
    pub fn new(network: impl Into<String>, delay: Duration) -> Self {
        Self {
            network: network.into(),
            delay,
            last_block: AtomicU64::new(0),
        }
    }

    /// Unix seconds, bumped past the last number handed out.
    fn next_block(&self) -> u64 {
        let now = Utc::now().timestamp().max(0) as u64;
        let mut issued = now;
        let _ = self
            .last_block
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                issued = now.max(last + 1);
                Some(issued)
            });
        issued
    }
}

#[async_trait]
impl AnchorBackend for SimulatedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Simulated
    }

    async fn submit(&self, request: &SubmitRequest) -> Result<AnchorReceipt, BackendError> {
        let gas_used = rand::rng().random_range(GAS_RANGE);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let millis = Utc::now().timestamp_millis().to_string();
        let transaction_hash = format!(
            "{}{}",
            TX_HASH_PREFIX,
            digest_concat(&[
                request.digests.data_hash.as_str(),
                request.digests.merkle_root.as_str(),
                millis.as_str(),
            ])
        );

        Ok(AnchorReceipt {
            batch_id: request.batch_id.clone(),
            transaction_hash,
            block_number: self.next_block(),
            digests: request.digests.clone(),
            previous_hash: request.previous_hash.clone(),
            network: self.network.clone(),
            status: AnchorStatus::Confirmed,
            gas_used: Some(gas_used),
            timestamp: now_timestamp(),
        })
    }
}
